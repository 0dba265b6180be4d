// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use morphic::{Converter, Convertible, Error, MappedConverter, Morph, Morphic, Shape, TypeRegistry};
use morphic_core::converter::{ConverterId, ErasedConverter};
use std::sync::Arc;

#[derive(Morph, Debug, PartialEq)]
struct Item {
    name: String,
    count: i32,
}

#[derive(Morph, Debug, PartialEq)]
struct Wrapper<T> {
    value: T,
    values: Vec<T>,
}

#[derive(Morph, Debug, PartialEq)]
struct Node {
    label: String,
    children: Vec<Node>,
}

#[derive(Morph, Debug)]
struct Nothing {
    #[morph(skip)]
    _hidden: i32,
}

#[derive(Debug, PartialEq)]
struct Celsius(f64);

impl Convertible for Celsius {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        let base = f64::resolve(registry)?;
        registry.get_or_build(Shape::of::<Celsius>(), &[], move |_| {
            Ok(Arc::new(MappedConverter::<Celsius, f64>::new(
                "Celsius",
                base,
                |c: &Celsius| c.0,
                |v: f64| Some(Celsius(v)),
                || Celsius(0.0),
            )) as Arc<dyn Converter<Celsius>>)
        })
    }
}

#[test]
fn test_cache_identity() {
    let registry = TypeRegistry::default();
    let a = registry.resolve::<Item>().unwrap();
    let b = registry.resolve::<Item>().unwrap();
    assert_eq!(ConverterId::of(&a), ConverterId::of(&b));
    let list_a = registry.resolve::<Vec<Item>>().unwrap();
    let list_b = registry.resolve::<Vec<Item>>().unwrap();
    assert_eq!(ConverterId::of(&list_a), ConverterId::of(&list_b));
}

#[test]
fn test_registries_are_isolated() {
    let one = TypeRegistry::default();
    let two = TypeRegistry::default();
    let a = one.resolve::<Item>().unwrap();
    let b = two.resolve::<Item>().unwrap();
    assert_ne!(ConverterId::of(&a), ConverterId::of(&b));
    assert!(!one.is_empty());
    one.clear(false);
    assert!(one.is_empty());
    assert!(!two.is_empty());
}

#[test]
fn test_generic_arguments_get_distinct_entries() {
    let registry = TypeRegistry::default();
    let ints = registry.resolve::<Wrapper<i32>>().unwrap();
    let texts = registry.resolve::<Wrapper<String>>().unwrap();
    assert_ne!(ConverterId::of(&ints), ConverterId::of(&texts));

    let int_arg = [ErasedConverter::new(i32::resolve(&registry).unwrap())];
    assert!(registry.contains(Shape::of::<Wrapper<i32>>(), &int_arg));
    let string_arg = [ErasedConverter::new(String::resolve(&registry).unwrap())];
    assert!(registry.contains(Shape::of::<Wrapper<String>>(), &string_arg));

    let morphic = Morphic::default().registry(registry);
    let value: Wrapper<i32> = morphic.from_text(r#"{"value": "5", "values": [1, "2"]}"#).unwrap();
    assert_eq!(
        value,
        Wrapper {
            value: 5,
            values: vec![1, 2]
        }
    );
    let text: Wrapper<String> = morphic.from_text(r#"{"value": 5, "values": [true]}"#).unwrap();
    assert_eq!(text.value, "5");
    assert_eq!(text.values, vec!["true".to_string()]);
}

#[test]
fn test_recursive_shape() {
    let morphic = Morphic::default();
    let text = r#"{"label":"root","children":[{"label":"leaf","children":[]}]}"#;
    let tree: Node = morphic.from_text(text).unwrap();
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].label, "leaf");
    assert_eq!(morphic.to_text(&tree).unwrap(), text);
    let copy = morphic.copy(&tree).unwrap();
    assert_eq!(copy, tree);
}

#[test]
fn test_failed_build_is_not_cached() {
    let registry = TypeRegistry::default();
    let first = registry.resolve::<Nothing>();
    assert!(matches!(first, Err(Error::Resolution(_))));
    assert!(!registry.contains(Shape::of::<Nothing>(), &[]));
    let second = registry.resolve::<Nothing>();
    assert!(matches!(second, Err(Error::Resolution(_))));
}

#[test]
fn test_registered_builder_wins_over_fallback() {
    let registry = TypeRegistry::default();
    let before = registry.resolve::<Celsius>().unwrap();
    registry.register::<Celsius, _>(Shape::of::<Celsius>(), None, |registry, _| {
        let base = f64::resolve(registry)?;
        Ok(Arc::new(MappedConverter::<Celsius, f64>::new(
            "Fahrenheit",
            base,
            |c: &Celsius| c.0 * 9.0 / 5.0 + 32.0,
            |f: f64| Some(Celsius((f - 32.0) * 5.0 / 9.0)),
            || Celsius(0.0),
        )) as Arc<dyn Converter<Celsius>>)
    });
    let after = registry.resolve::<Celsius>().unwrap();
    assert_ne!(ConverterId::of(&before), ConverterId::of(&after));
    assert_eq!(after.type_name(), "Fahrenheit");

    let morphic = Morphic::default().registry(registry.clone());
    assert_eq!(morphic.to_text(&Celsius(100.0)).unwrap(), "212.0");

    assert!(registry.remove(&after));
    registry.clear(true);
    let plain = registry.resolve::<Celsius>().unwrap();
    assert_eq!(plain.type_name(), "Celsius");
}

#[test]
fn test_concurrent_resolution_shares_one_converter() {
    let registry = TypeRegistry::default();
    let ids: Vec<ConverterId> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| ConverterId::of(&registry.resolve::<Wrapper<Item>>().unwrap())))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
}
