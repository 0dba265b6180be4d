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
use morphic::{AnyObject, Converter, Convertible, Error, MappedConverter, Morph, Morphic, TypeRegistry, Value};
use morphic_core::converter::{StringConverter, ValueInterceptor};
use morphic_core::entry::{Entry, EntryBuilder, EntryValue};
use std::borrow::Cow;
use std::sync::Arc;

#[derive(Default)]
struct YesNo;

impl ValueInterceptor<bool> for YesNo {
    fn intercept(&self, value: EntryValue<'_>) -> Option<bool> {
        match value {
            EntryValue::Str("yes") => Some(true),
            EntryValue::Str("no") => Some(false),
            _ => None,
        }
    }
}

fn upper_case() -> Arc<dyn Converter<String>> {
    Arc::new(MappedConverter::<String, String>::new(
        "UpperCase",
        Arc::new(StringConverter),
        |text: &String| text.clone(),
        |text: String| Some(text.to_uppercase()),
        String::new,
    ))
}

#[derive(Morph, Debug, PartialEq)]
struct Switch {
    label: String,
    #[morph(intercept = "YesNo")]
    enabled: bool,
    #[morph(converter = "upper_case()")]
    code: String,
}

#[test]
fn test_interceptor_and_override() {
    let morphic = Morphic::default();
    let switch: Switch = morphic
        .from_text(r#"{"label": "main", "enabled": "no", "code": "ab"}"#)
        .unwrap();
    assert_eq!(
        switch,
        Switch {
            label: "main".to_string(),
            enabled: false,
            code: "AB".to_string(),
        }
    );
    // the interceptor declines, so the base converter reads the value
    let switch: Switch = morphic.from_text(r#"{"enabled": 1}"#).unwrap();
    assert!(switch.enabled);
}

/// A domain wrapper with a hand-written converter.
#[derive(Debug, Clone, PartialEq)]
struct Email(String);

struct EmailConverter;

impl Converter<Email> for EmailConverter {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Email")
    }

    fn default_value(&self) -> Result<Email, Error> {
        Ok(Email(String::new()))
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<Email> {
        match value {
            EntryValue::Str(text) if text.contains('@') => Some(Email(text.to_lowercase())),
            _ => None,
        }
    }

    fn to_entry<'a>(
        &self,
        value: &'a Email,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        builder.entry(name, EntryValue::Str(&value.0))
    }

    fn copy(&self, value: &Email) -> Result<Email, Error> {
        Ok(value.clone())
    }

    fn equal(&self, a: &Email, b: &Email) -> bool {
        a == b
    }

    fn hash_value(&self, value: &Email) -> u64 {
        morphic_core::converter::std_hash(&value.0)
    }

    fn display(&self, value: &Email, _limit: usize) -> String {
        format!("<{}>", value.0)
    }
}

impl Convertible for Email {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        registry.leaf(|| EmailConverter)
    }
}

#[derive(Morph, Debug, PartialEq)]
struct Contact {
    name: String,
    emails: Vec<Email>,
    born: Option<NaiveDate>,
    seen: NaiveDateTime,
}

fn contact() -> Contact {
    Contact {
        name: "Ann".to_string(),
        emails: vec![Email("ann@example.org".to_string())],
        born: NaiveDate::from_ymd_opt(1990, 5, 17),
        seen: NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap(),
    }
}

#[test]
fn test_custom_scalar_types() {
    let _ = env_logger::builder().is_test(true).try_init();
    let morphic = Morphic::default();
    let parsed: Contact = morphic
        .from_text(
            r#"{"name": "Ann", "emails": ["Ann@Example.org", "broken"],
                "born": "1990-05-17", "seen": 1704164645000}"#,
        )
        .unwrap();
    assert_eq!(parsed.emails, vec![Email("ann@example.org".to_string()), Email(String::new())]);
    assert_eq!(parsed.born, contact().born);
    assert_eq!(parsed.seen, contact().seen);
    let text = morphic.to_text(&contact()).unwrap();
    assert_eq!(
        text,
        r#"{"name":"Ann","emails":["ann@example.org"],"born":"1990-05-17","seen":1704164645000}"#
    );
}

#[test]
fn test_copy_equal_hash_display() {
    let morphic = Morphic::default();
    let original = contact();
    let copy = morphic.copy(&original).unwrap();
    assert_eq!(copy, original);
    assert!(morphic.equal(&original, &copy).unwrap());
    assert_eq!(
        morphic.hash_value(&original).unwrap(),
        morphic.hash_value(&copy).unwrap()
    );
    let other = Contact {
        name: "Bob".to_string(),
        ..contact()
    };
    assert!(!morphic.equal(&original, &other).unwrap());
    assert_ne!(
        morphic.hash_value(&original).unwrap(),
        morphic.hash_value(&other).unwrap()
    );
    assert_eq!(
        morphic.display(&original).unwrap(),
        "{name=Ann, emails=[<ann@example.org>], born=1990-05-17, seen=1704164645000}"
    );
}

#[test]
fn test_display_limit() {
    let morphic = Morphic::default().display_limit(2);
    let numbers: Vec<i32> = (1..=5).collect();
    assert_eq!(morphic.display(&numbers).unwrap(), "[1, 2, ...]");
}

#[test]
fn test_objects_inside_values() {
    let morphic = Morphic::default();
    let object = AnyObject::new(contact(), morphic.get_registry()).unwrap();
    let tree = Value::List(vec![Value::I32(1), Value::Object(object)]);
    let text = morphic.to_text(&tree).unwrap();
    assert_eq!(
        text,
        r#"[1,{"name":"Ann","emails":["ann@example.org"],"born":"1990-05-17","seen":1704164645000}]"#
    );
    let copy = morphic.copy(&tree).unwrap();
    assert_eq!(copy, tree);
    let read: Value = morphic.from_text(&text).unwrap();
    assert_eq!(
        read.as_list().and_then(|items| items[1].get("name")),
        Some(&Value::from("Ann"))
    );
}
