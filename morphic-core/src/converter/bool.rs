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

use crate::converter::{Converter, Convertible};
use crate::entry::{Entry, EntryBuilder, EntryValue};
use crate::error::Error;
use crate::resolver::TypeRegistry;
use std::borrow::Cow;
use std::sync::Arc;

/// Text that reads as `false` besides the literal itself.
const FALSE_LIKE: [&str; 5] = ["", "0", "null", "0.0", "0,0"];

#[derive(Debug, Default)]
pub struct BoolConverter;

impl Converter<bool> for BoolConverter {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("bool")
    }

    fn default_value(&self) -> Result<bool, Error> {
        Ok(false)
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<bool> {
        match value {
            EntryValue::Bool(v) => Some(v),
            EntryValue::Str(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    Some(!FALSE_LIKE.iter().any(|f| f.eq_ignore_ascii_case(text)))
                }
            }
            EntryValue::Bytes(_) => None,
            EntryValue::F64(v) => Some(v as i64 != 0),
            EntryValue::F32(v) => Some(v as i64 != 0),
            other => other.as_i64().map(|v| v != 0),
        }
    }

    fn to_entry<'a>(
        &self,
        value: &'a bool,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        builder.entry(name, EntryValue::Bool(*value))
    }

    fn copy(&self, value: &bool) -> Result<bool, Error> {
        Ok(*value)
    }

    fn equal(&self, a: &bool, b: &bool) -> bool {
        a == b
    }

    fn hash_value(&self, value: &bool) -> u64 {
        *value as u64
    }

    fn display(&self, value: &bool, _limit: usize) -> String {
        value.to_string()
    }
}

impl Convertible for bool {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        registry.leaf(|| BoolConverter)
    }
}
