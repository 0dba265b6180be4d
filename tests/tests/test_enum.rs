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

#[derive(Morph, Debug, PartialEq, Clone, Copy)]
enum Color {
    Red,
    Green,
    #[morph(name = "blue")]
    Blue,
}

#[derive(Morph, Debug, PartialEq)]
struct Paint {
    name: String,
    color: Color,
    accents: Vec<Color>,
}

#[test]
fn test_enum_by_name_and_ordinal() {
    let _ = env_logger::builder().is_test(true).try_init();
    let morphic = Morphic::default();
    let colors: Vec<Color> = morphic
        .from_text(r#"["Green", "blue", 0, "2", "purple", null]"#)
        .unwrap();
    assert_eq!(
        colors,
        vec![
            Color::Green,
            Color::Blue,
            Color::Red,
            Color::Blue,
            Color::Red,
            Color::Red
        ]
    );
    assert_eq!(
        morphic.to_text(&vec![Color::Blue, Color::Green]).unwrap(),
        r#"["blue","Green"]"#
    );
}

#[test]
fn test_enum_fields() {
    let morphic = Morphic::default();
    let paint = Paint {
        name: "sea".to_string(),
        color: Color::Blue,
        accents: vec![Color::Red],
    };
    let text = morphic.to_text(&paint).unwrap();
    assert_eq!(text, r#"{"name":"sea","color":"blue","accents":["Red"]}"#);
    assert_eq!(morphic.from_text::<Paint>(&text).unwrap(), paint);
    let xml = morphic.to_xml(&paint).unwrap();
    assert_eq!(
        xml,
        "<i><name>sea</name><color>blue</color><accents><i>Red</i></accents></i>"
    );
    assert_eq!(morphic.from_xml::<Paint>(&xml).unwrap(), paint);
    assert_eq!(morphic.display(&paint).unwrap(), "{name=sea, color=blue, accents=[Red]}");
}
