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

use indexmap::IndexMap;
use morphic::{produce, Error, Morph, Morphic, Produce, Value};
use morphic_core::entry::{EnclosedEntries, EntryConsumer, EntryOutput, EntryValue};
use morphic_core::converter::TypedProvider;
use morphic_core::forms::{JsonConsumer, JsonProvider, ValueConsumer, ValueProvider};
use std::collections::HashMap;

/// Reads the top-level container and ignores every nested one.
#[derive(Default)]
struct ShallowConsumer {
    opened: bool,
    seen: Vec<String>,
}

impl EntryConsumer for ShallowConsumer {
    fn consume_entry(&mut self, name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        self.seen.push(format!("{}={}", name.unwrap_or("-"), value));
        Ok(())
    }

    fn consume_null(&mut self, name: Option<&str>) -> Result<(), Error> {
        self.seen.push(format!("{}=null", name.unwrap_or("-")));
        Ok(())
    }

    fn consume_container(
        &mut self,
        _name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        _named: bool,
    ) -> Result<(), Error> {
        if self.opened {
            return Ok(());
        }
        self.opened = true;
        entries.consume(self)
    }
}

impl EntryOutput for ShallowConsumer {
    type Output = Vec<String>;

    fn output(self) -> Result<Vec<String>, Error> {
        Ok(self.seen)
    }
}

/// Hands every nested container to a value tree builder.
#[derive(Default)]
struct CapturingConsumer {
    opened: bool,
    captured: Vec<Value>,
}

impl EntryConsumer for CapturingConsumer {
    fn consume_entry(&mut self, _name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        self.captured.push(Value::from(value));
        Ok(())
    }

    fn consume_null(&mut self, _name: Option<&str>) -> Result<(), Error> {
        self.captured.push(Value::Null);
        Ok(())
    }

    fn consume_container(
        &mut self,
        _name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<(), Error> {
        if !self.opened {
            self.opened = true;
            return entries.consume(self);
        }
        let value = entries.intercept_output(ValueConsumer::nested(named))?;
        self.captured.push(value);
        Ok(())
    }
}

impl EntryOutput for CapturingConsumer {
    type Output = Vec<Value>;

    fn output(self) -> Result<Vec<Value>, Error> {
        Ok(self.captured)
    }
}

#[test]
fn test_ignored_containers_are_drained() {
    let seen = produce(
        Box::new(JsonProvider::new(r#"{"a": 1, "skip": {"x": [2, 3], "y": 4}, "b": [5], "c": 6}"#)),
        ShallowConsumer::default(),
    )
    .unwrap();
    assert_eq!(seen, vec!["a=1", "c=6"]);
}

#[test]
fn test_intercepted_containers_keep_their_shape() {
    let captured = produce(
        Box::new(JsonProvider::new(r#"[1, {"k": [true]}, [], null]"#)),
        CapturingConsumer::default(),
    )
    .unwrap();
    let mut inner = IndexMap::new();
    inner.insert("k".to_string(), Value::List(vec![Value::Bool(true)]));
    assert_eq!(
        captured,
        vec![
            Value::I32(1),
            Value::Map(inner),
            Value::List(vec![]),
            Value::Null
        ]
    );
}

#[test]
fn test_untyped_nested_maps() {
    let morphic = Morphic::default();
    let tree: Value = morphic.from_text(r#"{"k":{"x":1,"y":2}}"#).unwrap();
    let inner = tree.get("k").and_then(Value::as_map).unwrap();
    assert_eq!(inner.get("x"), Some(&Value::I32(1)));
    assert_eq!(inner.get("y"), Some(&Value::I32(2)));

    let map: HashMap<String, Value> = morphic.from_text(r#"{"k":{"x":1,"y":2}}"#).unwrap();
    assert_eq!(map["k"].get("y").and_then(Value::as_i64), Some(2));
}

#[derive(Morph, Debug, PartialEq)]
struct Deep {
    level: i32,
    next: Option<Vec<Deep>>,
}

#[test]
fn test_depth_limit() {
    if morphic_core::error::should_panic_on_error() {
        return;
    }
    let morphic = Morphic::default().max_depth(3);
    let ok: Value = morphic.from_text("[[[1]]]").unwrap();
    assert_eq!(ok.to_string(), "[[[1]]]");
    let deep: Result<Value, Error> = morphic.from_text("[[[[1]]]]");
    assert!(matches!(deep, Err(Error::DepthExceed(_))));

    let nested: Result<Deep, Error> =
        morphic.from_text(r#"{"level":1,"next":[{"level":2,"next":[{"level":3}]}]}"#);
    assert!(matches!(nested, Err(Error::DepthExceed(_))));
}

#[test]
fn test_malformed_input_fails_the_pass() {
    let morphic = Morphic::default();
    let broken: Result<Vec<i32>, Error> = morphic.from_text("[1, 2");
    assert!(matches!(broken, Err(Error::Protocol(_))));
    let broken: Result<Value, Error> = morphic.from_xml("<a><b>1</a>");
    assert!(matches!(broken, Err(Error::Protocol(_))));
}

#[derive(Morph, Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[test]
fn test_naming_preference_reaches_schemas() {
    let morphic = Morphic::default();
    let converter = morphic.converter::<Point>().unwrap();
    let point = Point { x: 1, y: 2 };
    let text = Produce::new(Box::new(TypedProvider::new(&point, converter.clone())))
        .nameless(Some(true))
        .run(JsonConsumer::new())
        .unwrap();
    assert_eq!(text, "[1,2]");

    // value trees carry their own naming
    let tree: Value = morphic.from_text("{a: 1}").unwrap();
    let text = Produce::new(Box::new(ValueProvider::new(&tree)))
        .nameless(Some(true))
        .run(JsonConsumer::new())
        .unwrap();
    assert_eq!(text, r#"{"a":1}"#);
}
