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

use morphic::{Morph, Morphic, Visibility};

#[derive(Morph, Debug, PartialEq)]
struct Pair {
    a: i32,
    b: i32,
}

#[test]
fn test_named_round_trip() {
    let morphic = Morphic::default();
    let pair: Pair = morphic.from_text(r#"{"a":1,"b":2}"#).unwrap();
    assert_eq!(pair, Pair { a: 1, b: 2 });
    assert_eq!(morphic.to_text(&pair).unwrap(), r#"{"a":1,"b":2}"#);
}

#[test]
fn test_missing_and_unknown_members() {
    let morphic = Morphic::default();
    let pair: Pair = morphic.from_text(r#"{"c": [1, {"d": 2}], "b": 5}"#).unwrap();
    assert_eq!(pair, Pair { a: 0, b: 5 });
}

#[test]
fn test_positional_input_on_named_schema() {
    // named schemas still read positional members by declaration order
    let morphic = Morphic::default();
    let pair: Pair = morphic.from_text("[3, 4]").unwrap();
    assert_eq!(pair, Pair { a: 3, b: 4 });
}

#[derive(Morph, Debug, PartialEq)]
struct Swapped {
    #[morph(opt = 1)]
    a: i32,
    #[morph(opt = 0)]
    b: i32,
}

#[test]
fn test_ordinal_zero_binds_first_value() {
    let morphic = Morphic::default();
    let value: Swapped = morphic.from_text("[1,2]").unwrap();
    assert_eq!(value, Swapped { a: 2, b: 1 });
    assert_eq!(morphic.to_text(&value).unwrap(), "[1,2]");
    let named: Swapped = morphic.from_text("{a: 2, b: 1}").unwrap();
    assert_eq!(named, value);
}

#[derive(Morph, Debug, PartialEq)]
struct Account {
    pub id: i64,
    pub(crate) owner: String,
    secret: String,
}

#[test]
fn test_visibility_bound() {
    let account = Account {
        id: 9,
        owner: "ann".to_string(),
        secret: "pw".to_string(),
    };
    let all = Morphic::default();
    assert_eq!(
        all.to_text(&account).unwrap(),
        r#"{"id":9,"owner":"ann","secret":"pw"}"#
    );
    let internal = Morphic::default().visibility_bound(Visibility::Internal);
    assert_eq!(
        internal.to_text(&account).unwrap(),
        r#"{"id":9,"owner":"ann"}"#
    );
    let public = Morphic::default().visibility_bound(Visibility::Public);
    assert_eq!(public.to_text(&account).unwrap(), r#"{"id":9}"#);
}

#[derive(Morph, Debug, PartialEq)]
#[morph(properties = "label, id")]
struct Listed {
    id: i32,
    label: String,
    note: String,
}

#[test]
fn test_property_list_order() {
    let morphic = Morphic::default();
    let value = Listed {
        id: 1,
        label: "x".to_string(),
        note: "hidden".to_string(),
    };
    assert_eq!(morphic.to_text(&value).unwrap(), r#"{"label":"x","id":1}"#);
    let schema = morphic.schema::<Listed>().unwrap();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["label", "id"]);
}

#[derive(Morph, Debug, PartialEq)]
struct Renamed {
    #[morph(name = "full_name")]
    name: String,
    #[morph(skip)]
    cached: Vec<u8>,
}

#[test]
fn test_rename_and_skip() {
    let morphic = Morphic::default();
    let value: Renamed = morphic.from_text(r#"{"full_name": "Ada", "cached": [1]}"#).unwrap();
    assert_eq!(
        value,
        Renamed {
            name: "Ada".to_string(),
            cached: vec![],
        }
    );
    assert_eq!(morphic.to_text(&value).unwrap(), r#"{"full_name":"Ada"}"#);
}

#[derive(Morph, Debug, PartialEq)]
#[morph(nameless)]
struct Rgb(u8, u8, u8);

#[test]
fn test_tuple_struct_nameless() {
    let morphic = Morphic::default();
    let color: Rgb = morphic.from_text("[255, 128, 0]").unwrap();
    assert_eq!(color, Rgb(255, 128, 0));
    assert_eq!(morphic.to_text(&color).unwrap(), "[255,128,0]");
}

#[derive(Morph, Debug, PartialEq)]
struct Outer {
    name: String,
    inner: Pair,
    pairs: Vec<Pair>,
    maybe: Option<Pair>,
}

#[test]
fn test_nested_structs() {
    let morphic = Morphic::default();
    let text = r#"{"name":"o","inner":{"a":1,"b":2},"pairs":[{"a":3,"b":4},[5,6]],"maybe":null}"#;
    let outer: Outer = morphic.from_text(text).unwrap();
    assert_eq!(
        outer,
        Outer {
            name: "o".to_string(),
            inner: Pair { a: 1, b: 2 },
            pairs: vec![Pair { a: 3, b: 4 }, Pair { a: 5, b: 6 }],
            maybe: None,
        }
    );
    assert_eq!(
        morphic.to_text(&outer).unwrap(),
        r#"{"name":"o","inner":{"a":1,"b":2},"pairs":[{"a":3,"b":4},{"a":5,"b":6}],"maybe":null}"#
    );
}

#[derive(Morph, Debug, PartialEq, Default)]
#[morph(default)]
struct Settings {
    width: u32,
    title: String,
    tags: Vec<String>,
}

#[test]
fn test_update_keeps_unmentioned_fields() {
    let morphic = Morphic::default();
    let schema = morphic.schema::<Settings>().unwrap();
    let mut settings = Settings {
        width: 80,
        title: "main".to_string(),
        tags: vec!["a".to_string()],
    };
    schema
        .update_from(&mut settings, r#"{"title": "side"}"#, &morphic::JsonFactory)
        .unwrap();
    assert_eq!(settings.width, 80);
    assert_eq!(settings.title, "side");
    assert_eq!(settings.tags, vec!["a".to_string()]);
}

#[test]
fn test_instance_helpers() {
    let morphic = Morphic::default();
    let schema = morphic.schema::<Pair>().unwrap();
    let pairs = schema
        .instances_from(r#"[{"a":1,"b":2},{"a":3}]"#, &morphic::JsonFactory)
        .unwrap();
    assert_eq!(pairs, vec![Pair { a: 1, b: 2 }, Pair { a: 3, b: 0 }]);
    assert_eq!(
        schema.instances_to(&pairs, &morphic::JsonFactory).unwrap(),
        r#"[{"a":1,"b":2},{"a":3,"b":0}]"#
    );
    let subset = schema
        .instance_to_with(&pairs[0], &morphic::JsonFactory, Some(&["b"][..]), None)
        .unwrap();
    assert_eq!(subset, r#"{"b":2}"#);
    let positional = schema
        .instance_to_with(&pairs[0], &morphic::JsonFactory, None, Some(true))
        .unwrap();
    assert_eq!(positional, "[1,2]");
}
