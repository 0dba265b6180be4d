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

use crate::converter::Converter;
use crate::entry::{Entry, EntryBuilder, EntryValue};
use crate::error::Error;
use std::borrow::Cow;
use std::sync::Arc;

/// Scalar types a [`MappedConverter`] can map onto.
pub trait ScalarBase: 'static {
    fn as_entry_value(&self) -> EntryValue<'_>;
}

impl ScalarBase for String {
    fn as_entry_value(&self) -> EntryValue<'_> {
        EntryValue::Str(self)
    }
}

impl ScalarBase for i64 {
    fn as_entry_value(&self) -> EntryValue<'_> {
        EntryValue::I64(*self)
    }
}

impl ScalarBase for i32 {
    fn as_entry_value(&self) -> EntryValue<'_> {
        EntryValue::I32(*self)
    }
}

impl ScalarBase for f64 {
    fn as_entry_value(&self) -> EntryValue<'_> {
        EntryValue::F64(*self)
    }
}

impl ScalarBase for bool {
    fn as_entry_value(&self) -> EntryValue<'_> {
        EntryValue::Bool(*self)
    }
}

/// Converter of `T` defined by a mapping to and from a supported scalar
/// base type `B`.
///
/// Decoding goes through the base converter first, so `T` gets the same
/// coercions as `B`. A base value `from_base` rejects counts as input that
/// does not fit.
pub struct MappedConverter<T, B: 'static> {
    name: &'static str,
    base: Arc<dyn Converter<B>>,
    to_base: fn(&T) -> B,
    from_base: fn(B) -> Option<T>,
    default: fn() -> T,
}

impl<T: 'static, B: ScalarBase> MappedConverter<T, B> {
    pub fn new(
        name: &'static str,
        base: Arc<dyn Converter<B>>,
        to_base: fn(&T) -> B,
        from_base: fn(B) -> Option<T>,
        default: fn() -> T,
    ) -> Self {
        MappedConverter {
            name,
            base,
            to_base,
            from_base,
            default,
        }
    }
}

impl<T: 'static, B: ScalarBase> Converter<T> for MappedConverter<T, B> {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.name)
    }

    fn default_value(&self) -> Result<T, Error> {
        Ok((self.default)())
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<T> {
        self.base.from_entry(value).and_then(self.from_base)
    }

    fn to_entry<'a>(
        &self,
        value: &'a T,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        let base = (self.to_base)(value);
        builder.entry(name, base.as_entry_value())
    }

    fn copy(&self, value: &T) -> Result<T, Error> {
        (self.from_base)((self.to_base)(value))
            .ok_or_else(|| Error::unknown(format!("{} value does not map back", self.name)))
    }

    fn equal(&self, a: &T, b: &T) -> bool {
        self.base.equal(&(self.to_base)(a), &(self.to_base)(b))
    }

    fn hash_value(&self, value: &T) -> u64 {
        self.base.hash_value(&(self.to_base)(value))
    }

    fn display(&self, value: &T, limit: usize) -> String {
        self.base.display(&(self.to_base)(value), limit)
    }
}
