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

use crate::converter::{std_hash, Converter, Convertible};
use crate::entry::{Entry, EntryBuilder, EntryValue};
use crate::error::Error;
use crate::resolver::TypeRegistry;
use std::borrow::Cow;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct StringConverter;

impl Converter<String> for StringConverter {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("String")
    }

    fn default_value(&self) -> Result<String, Error> {
        Ok(String::new())
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<String> {
        match value {
            EntryValue::Str(text) => Some(text.to_owned()),
            EntryValue::Bytes(_) => None,
            other => Some(other.to_string()),
        }
    }

    fn to_entry<'a>(
        &self,
        value: &'a String,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        builder.entry(name, EntryValue::Str(value))
    }

    fn copy(&self, value: &String) -> Result<String, Error> {
        Ok(value.clone())
    }

    fn equal(&self, a: &String, b: &String) -> bool {
        a == b
    }

    fn hash_value(&self, value: &String) -> u64 {
        std_hash(value)
    }

    fn display(&self, value: &String, _limit: usize) -> String {
        value.clone()
    }
}

impl Convertible for String {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        registry.leaf(|| StringConverter)
    }
}

/// `char` travels as a one-character string.
///
/// Decoding also takes an integer code point, or digit-only text read as a
/// code point. Empty text is `'\0'`.
#[derive(Debug, Default)]
pub struct CharConverter;

impl Converter<char> for CharConverter {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("char")
    }

    fn default_value(&self) -> Result<char, Error> {
        Ok('\0')
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<char> {
        match value {
            EntryValue::Str(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => Some('\0'),
                    (Some(c), None) => Some(c),
                    _ if text.bytes().all(|b| b.is_ascii_digit()) => {
                        text.parse::<u32>().ok().and_then(char::from_u32)
                    }
                    _ => None,
                }
            }
            EntryValue::Bool(v) => Some(if v { '1' } else { '0' }),
            EntryValue::Bytes(_) => None,
            other => other
                .as_i64()
                .and_then(|code| u32::try_from(code).ok())
                .and_then(char::from_u32),
        }
    }

    fn to_entry<'a>(
        &self,
        value: &'a char,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        let mut buf = [0u8; 4];
        builder.entry(name, EntryValue::Str(value.encode_utf8(&mut buf)))
    }

    fn copy(&self, value: &char) -> Result<char, Error> {
        Ok(*value)
    }

    fn equal(&self, a: &char, b: &char) -> bool {
        a == b
    }

    fn hash_value(&self, value: &char) -> u64 {
        *value as u64
    }

    fn display(&self, value: &char, _limit: usize) -> String {
        value.to_string()
    }
}

impl Convertible for char {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        registry.leaf(|| CharConverter)
    }
}
