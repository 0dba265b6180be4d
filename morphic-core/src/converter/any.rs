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

//! Untyped values.
//!
//! [`Value`] covers every scalar entry kind, positional lists, ordered
//! named maps, and any registered type wrapped in an [`AnyObject`].
//! Decoding never needs a schema: nested containers become lists or maps.

use crate::converter::{
    combine_hash, display_items, std_hash, Converter, Convertible, ErasedConverter,
};
use crate::entry::{EnclosedEntries, Entry, EntryBuilder, EntryValue};
use crate::error::Error;
use crate::forms::value::{emit_value, ValueConsumer};
use crate::resolver::TypeRegistry;
use indexmap::IndexMap;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object(AnyObject),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of any integer variant.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v as i64),
            Value::I16(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v as f64),
            Value::F64(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Member `name` of a map value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_map()?.get(name)
    }

    fn hash_code(&self) -> u64 {
        match self {
            Value::Null => 0,
            Value::Bool(v) => *v as u64,
            Value::I8(_) | Value::I16(_) | Value::I32(_) | Value::I64(_) => {
                self.as_i64().map_or(0, |v| v as u64)
            }
            Value::F32(v) => v.to_bits() as u64,
            Value::F64(v) => v.to_bits(),
            Value::Str(v) => std_hash(v),
            Value::Bytes(v) => std_hash(v),
            Value::List(items) => items
                .iter()
                .fold(1, |code, item| combine_hash(code, item.hash_code())),
            Value::Map(map) => map.iter().fold(0u64, |code, (k, v)| {
                code.wrapping_add(combine_hash(std_hash(k), v.hash_code()))
            }),
            Value::Object(object) => object.hash_code(),
        }
    }

    fn render(&self, limit: usize) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(v) => v.to_string(),
            Value::I8(v) => v.to_string(),
            Value::I16(v) => v.to_string(),
            Value::I32(v) => v.to_string(),
            Value::I64(v) => v.to_string(),
            Value::F32(v) => format!("{:?}", v),
            Value::F64(v) => format!("{:?}", v),
            Value::Str(v) => v.clone(),
            Value::Bytes(v) => format!("<{} bytes>", v.len()),
            Value::List(items) => {
                display_items(items.iter().map(|item| item.render(limit)), limit, "[", "]")
            }
            Value::Map(map) => display_items(
                map.iter().map(|(k, v)| format!("{}={}", k, v.render(limit))),
                limit,
                "{",
                "}",
            ),
            Value::Object(object) => object.render(limit),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(usize::MAX))
    }
}

impl From<EntryValue<'_>> for Value {
    fn from(value: EntryValue<'_>) -> Self {
        match value {
            EntryValue::Str(v) => Value::Str(v.to_string()),
            EntryValue::I64(v) => Value::I64(v),
            EntryValue::I32(v) => Value::I32(v),
            EntryValue::I16(v) => Value::I16(v),
            EntryValue::I8(v) => Value::I8(v),
            EntryValue::F64(v) => Value::F64(v),
            EntryValue::F32(v) => Value::F32(v),
            EntryValue::Bool(v) => Value::Bool(v),
            EntryValue::Bytes(v) => Value::Bytes(v.to_vec()),
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_value_from!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => Str,
    Vec<Value> => List,
    IndexMap<String, Value> => Map,
    AnyObject => Object,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

/// A value of any registered type, carried with its converter.
#[derive(Clone)]
pub struct AnyObject {
    value: Arc<dyn Any + Send + Sync>,
    converter: ErasedConverter,
}

impl AnyObject {
    /// Wraps `value` with the converter `registry` resolves for it.
    pub fn new<T: Convertible + Send + Sync>(value: T, registry: &TypeRegistry) -> Result<Self, Error> {
        Ok(Self::with_converter(value, T::resolve(registry)?))
    }

    pub fn with_converter<T: Send + Sync + 'static>(
        value: T,
        converter: Arc<dyn Converter<T>>,
    ) -> Self {
        AnyObject {
            value: Arc::new(value),
            converter: ErasedConverter::new(converter),
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn converter(&self) -> &ErasedConverter {
        &self.converter
    }

    pub(crate) fn encode<'a>(
        &'a self,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        let value: &'a dyn Any = &*self.value;
        self.converter.encode(value, name, builder)
    }

    fn hash_code(&self) -> u64 {
        self.converter.hash_value(&*self.value)
    }

    fn render(&self, limit: usize) -> String {
        self.converter.display(&*self.value, limit)
    }
}

impl PartialEq for AnyObject {
    fn eq(&self, other: &Self) -> bool {
        self.converter.value_type() == other.converter.value_type()
            && self.converter.equal(&*self.value, &*other.value)
    }
}

impl fmt::Debug for AnyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.converter.type_name(), self.render(10))
    }
}

/// Converter of [`Value`]. Decodes anything; nested containers are read
/// by intercepting them with a list or map builder.
#[derive(Debug, Default)]
pub struct ValueConverter;

impl Converter<Value> for ValueConverter {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Value")
    }

    fn default_value(&self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn is_nullable(&self) -> bool {
        true
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<Value> {
        Some(Value::from(value))
    }

    fn from_null(&self) -> Option<Value> {
        Some(Value::Null)
    }

    fn from_entries(
        &self,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<Option<Value>, Error> {
        let value = entries.intercept_output(ValueConsumer::nested(named))?;
        Ok(Some(value))
    }

    fn to_entry<'a>(
        &self,
        value: &'a Value,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        emit_value(value, name, builder)
    }

    fn copy(&self, value: &Value) -> Result<Value, Error> {
        Ok(value.clone())
    }

    fn equal(&self, a: &Value, b: &Value) -> bool {
        a == b
    }

    fn hash_value(&self, value: &Value) -> u64 {
        value.hash_code()
    }

    fn display(&self, value: &Value, limit: usize) -> String {
        value.render(limit)
    }
}

impl Convertible for Value {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        registry.leaf(|| ValueConverter)
    }
}
