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

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use morphic::{Morph, Morphic, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Morph, Debug, PartialEq)]
struct Order {
    id: i64,
    customer: String,
    lines: Vec<Line>,
    notes: Option<String>,
    totals: BTreeMap<String, f64>,
    tags: HashSet<String>,
    placed: NaiveDate,
    shipped: Option<NaiveDateTime>,
}

#[derive(Morph, Debug, PartialEq)]
struct Line {
    sku: String,
    quantity: u32,
    express: bool,
}

fn sample() -> Order {
    let placed = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    Order {
        id: 1001,
        customer: "A & B <ltd>".to_string(),
        lines: vec![
            Line {
                sku: "x-1".to_string(),
                quantity: 2,
                express: false,
            },
            Line {
                sku: "y-2".to_string(),
                quantity: 1,
                express: true,
            },
        ],
        notes: None,
        totals: BTreeMap::from([("net".to_string(), 10.5), ("tax".to_string(), 2.1)]),
        tags: HashSet::from(["new".to_string()]),
        placed,
        shipped: placed.and_hms_milli_opt(12, 30, 0, 250),
    }
}

#[test]
fn test_json_round_trip() {
    let morphic = Morphic::default();
    let order = sample();
    let text = morphic.to_text(&order).unwrap();
    assert!(text.contains(r#""placed":"2024-03-01""#));
    assert!(text.contains(r#""notes":null"#));
    let back: Order = morphic.from_text(&text).unwrap();
    assert_eq!(back, order);
}

#[test]
fn test_xml_round_trip() {
    let morphic = Morphic::default();
    let order = sample();
    let xml = morphic.to_xml(&order).unwrap();
    assert!(xml.starts_with("<i><id>1001</id><customer>A &amp; B &lt;ltd&gt;</customer>"));
    assert!(xml.contains("<notes/>"));
    let back: Order = morphic.from_xml(&xml).unwrap();
    assert_eq!(back, order);
}

#[test]
fn test_value_round_trip() {
    let morphic = Morphic::default();
    let order = sample();
    let tree = morphic.to_value(&order).unwrap();
    assert_eq!(tree.get("id").and_then(Value::as_i64), Some(1001));
    let lines = tree.get("lines").and_then(Value::as_list).unwrap();
    assert_eq!(lines[1].get("express"), Some(&Value::Bool(true)));
    let back: Order = morphic.from_value(&tree).unwrap();
    assert_eq!(back, order);
}

#[test]
fn test_xml_documents() {
    let morphic = Morphic::default();
    let text = r#"<?xml version="1.0"?>
        <!-- exported -->
        <order kind="web">
            <sku>a</sku>
            <quantity>3</quantity>
            <express></express>
        </order>"#;
    let line: Line = morphic.from_xml(text).unwrap();
    assert_eq!(
        line,
        Line {
            sku: "a".to_string(),
            quantity: 3,
            express: false,
        }
    );

    let tree: Value = morphic
        .from_xml("<r><a>1</a><list><v>1</v><v>2</v></list><none/><cdata><![CDATA[<raw>]]></cdata></r>")
        .unwrap();
    assert_eq!(tree.get("a"), Some(&Value::from("1")));
    assert_eq!(
        tree.get("list"),
        Some(&Value::List(vec![Value::from("1"), Value::from("2")]))
    );
    assert_eq!(tree.get("none"), Some(&Value::Null));
    assert_eq!(tree.get("cdata"), Some(&Value::from("<raw>")));
}

#[test]
fn test_value_tree_to_text_formats() {
    let morphic = Morphic::default();
    let mut map = IndexMap::new();
    map.insert("name".to_string(), Value::from("box"));
    map.insert(
        "sizes".to_string(),
        Value::List(vec![Value::I32(1), Value::F64(2.5)]),
    );
    map.insert("empty".to_string(), Value::Map(IndexMap::new()));
    let tree = Value::Map(map);
    assert_eq!(
        morphic.to_text(&tree).unwrap(),
        r#"{"name":"box","sizes":[1,2.5],"empty":{}}"#
    );
    assert_eq!(
        morphic.to_xml(&tree).unwrap(),
        "<i><name>box</name><sizes><i>1</i><i>2.5</i></sizes><empty></empty></i>"
    );
}

#[derive(Morph, Debug, PartialEq)]
struct Holder {
    counts: BTreeMap<String, i32>,
    labels: HashMap<String, String>,
}

#[test]
fn test_xml_map_keys_round_trip() {
    let morphic = Morphic::default();
    let key_sets: [&[&str]; 5] = [&["i"], &["a b", "c"], &[""], &["1", "x<\"y"], &["e", "i", "j"]];
    for keys in key_sets {
        let holder = Holder {
            counts: keys
                .iter()
                .enumerate()
                .map(|(n, k)| (k.to_string(), n as i32 + 1))
                .collect(),
            labels: keys.iter().map(|k| (k.to_string(), k.to_string())).collect(),
        };
        let xml = morphic.to_xml(&holder).unwrap();
        let back: Holder = morphic.from_xml(&xml).unwrap();
        assert_eq!(back, holder, "{}", xml);
    }

    let single = Holder {
        counts: BTreeMap::from([("i".to_string(), 1)]),
        labels: HashMap::from([("".to_string(), "x".to_string())]),
    };
    assert_eq!(
        morphic.to_xml(&single).unwrap(),
        r#"<i><counts><e k="i">1</e></counts><labels><e k="">x</e></labels></i>"#
    );
}

#[test]
fn test_xml_deep_input_fails() {
    let morphic = Morphic::default();
    let depth = 300_000;
    let doc = format!("{}1{}", "<a>".repeat(depth), "</a>".repeat(depth));
    assert!(matches!(
        morphic.from_xml::<Value>(&doc),
        Err(morphic::Error::DepthExceed(_))
    ));
}
