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

use morphic::{Morph, Morphic};

#[derive(Morph, Debug, PartialEq)]
struct Dense {
    #[morph(opt = 0)]
    x: i32,
    #[morph(opt = 1)]
    y: i32,
    unmarked: i32,
}

#[derive(Morph, Debug, PartialEq)]
struct Gapped {
    #[morph(opt = 0)]
    x: i32,
    #[morph(opt = 2)]
    y: i32,
}

#[derive(Morph, Debug, PartialEq)]
struct Filled {
    #[morph(opt)]
    first: String,
    #[morph(opt = 0)]
    second: String,
    #[morph(opt)]
    third: String,
}

#[test]
fn test_dense_ordinals_are_nameless() {
    let _ = env_logger::builder().is_test(true).try_init();
    let morphic = Morphic::default();
    let schema = morphic.schema::<Dense>().unwrap();
    assert!(schema.nameless());
    assert_eq!(schema.fields().len(), 2);
    let value = Dense {
        x: 1,
        y: 2,
        unmarked: 3,
    };
    assert_eq!(morphic.to_text(&value).unwrap(), "[1,2]");
    let back: Dense = morphic.from_text("[1,2,3]").unwrap();
    assert_eq!(
        back,
        Dense {
            x: 1,
            y: 2,
            unmarked: 0
        }
    );
}

#[test]
fn test_gap_falls_back_to_named() {
    let _ = env_logger::builder().is_test(true).try_init();
    let morphic = Morphic::default();
    let schema = morphic.schema::<Gapped>().unwrap();
    assert!(!schema.nameless());
    let value = Gapped { x: 1, y: 2 };
    assert_eq!(morphic.to_text(&value).unwrap(), r#"{"x":1,"y":2}"#);
    let back: Gapped = morphic.from_text(r#"{"y":2,"x":1}"#).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_unnumbered_markers_take_free_ordinals() {
    let morphic = Morphic::default();
    let schema = morphic.schema::<Filled>().unwrap();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["second", "first", "third"]);
    let value: Filled = morphic.from_text("[b, a, c]").unwrap();
    assert_eq!(value.first, "a");
    assert_eq!(value.second, "b");
    assert_eq!(value.third, "c");
}

#[test]
fn test_forced_named_pass() {
    let morphic = Morphic::default();
    let schema = morphic.schema::<Dense>().unwrap();
    let value = Dense {
        x: 1,
        y: 2,
        unmarked: 0,
    };
    let named = schema
        .instance_to_with(&value, &morphic::JsonFactory, None, Some(false))
        .unwrap();
    assert_eq!(named, r#"{"x":1,"y":2}"#);
}
