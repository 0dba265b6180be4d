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
struct Reading {
    count: i32,
    maybe: Option<i32>,
    ratio: f64,
    flag: bool,
    letter: char,
    label: String,
}

#[test]
fn test_bad_numbers_fall_back() {
    let _ = env_logger::builder().is_test(true).try_init();
    let morphic = Morphic::default();
    let reading: Reading = morphic
        .from_text(r#"{"count": "abc", "maybe": "abc", "ratio": [1], "flag": {}, "letter": "", "label": 1.5}"#)
        .unwrap();
    assert_eq!(
        reading,
        Reading {
            count: 0,
            maybe: None,
            ratio: 0.0,
            flag: false,
            letter: '\0',
            label: "1.5".to_string(),
        }
    );
}

#[test]
fn test_cross_kind_coercions() {
    let morphic = Morphic::default();
    let reading: Reading = morphic
        .from_text(r#"{"count": "12.9", "maybe": true, "ratio": "2", "flag": "yes", "letter": 65, "label": false}"#)
        .unwrap();
    assert_eq!(
        reading,
        Reading {
            count: 12,
            maybe: Some(1),
            ratio: 2.0,
            flag: true,
            letter: 'A',
            label: "false".to_string(),
        }
    );
}

#[test]
fn test_boolean_strings() {
    let morphic = Morphic::default();
    let flags: Vec<bool> = morphic
        .from_text(r#"["TRUE", "False", "", "0", "null", "0.0", "0,0", "anything", 0, 2, 0.0]"#)
        .unwrap();
    assert_eq!(
        flags,
        vec![true, false, false, false, false, false, false, true, false, true, false]
    );
}

#[test]
fn test_numbers_across_widths() {
    let morphic = Morphic::default();
    let small: Vec<i8> = morphic.from_text("[1, 300, -2]").unwrap();
    assert_eq!(small, vec![1, 300i32 as i8, -2]);
    let wide: Vec<u64> = morphic.from_text(r#"[1, "18446744073709551615"]"#).unwrap();
    assert_eq!(wide, vec![1, u64::MAX]);
    let floats: Vec<f32> = morphic.from_text(r#"[1, "2.5", true]"#).unwrap();
    assert_eq!(floats, vec![1.0, 2.5, 1.0]);
}

#[test]
fn test_null_handling() {
    let morphic = Morphic::default();
    let values: Vec<Option<String>> = morphic.from_text(r#"["a", null, 3]"#).unwrap();
    assert_eq!(
        values,
        vec![Some("a".to_string()), None, Some("3".to_string())]
    );
    assert_eq!(morphic.to_text(&values).unwrap(), r#"["a",null,"3"]"#);
    let counts: Vec<i32> = morphic.from_text("[null, 1]").unwrap();
    assert_eq!(counts, vec![0, 1]);
}

#[test]
fn test_empty_text_as_empty_collection() {
    let morphic = Morphic::default();
    let empty: Vec<i32> = morphic.from_xml("<i></i>").unwrap();
    assert!(empty.is_empty());
}
