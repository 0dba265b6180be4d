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
use crate::entry::{EnclosedEntries, Entry, EntryBuilder, EntryValue};
use crate::error::Error;
use crate::schema::Schema;
use std::borrow::Cow;
use std::sync::Arc;

/// Gets the first look at raw scalar input of a field.
///
/// Returning `None` declines the value, which then goes to the field's
/// regular converter.
pub trait ValueInterceptor<T>: Send + Sync + 'static {
    fn intercept(&self, value: EntryValue<'_>) -> Option<T>;

    fn intercept_null(&self) -> Option<T> {
        None
    }
}

/// Decorator putting a [`ValueInterceptor`] in front of a base converter.
/// Everything but scalar and null decoding is the base converter's.
pub struct InterceptedConverter<T: 'static> {
    base: Arc<dyn Converter<T>>,
    interceptor: Box<dyn ValueInterceptor<T>>,
}

impl<T: 'static> InterceptedConverter<T> {
    pub fn new(base: Arc<dyn Converter<T>>, interceptor: impl ValueInterceptor<T>) -> Self {
        Self::boxed(base, Box::new(interceptor))
    }

    pub fn boxed(base: Arc<dyn Converter<T>>, interceptor: Box<dyn ValueInterceptor<T>>) -> Self {
        InterceptedConverter { base, interceptor }
    }
}

impl<T: 'static> Converter<T> for InterceptedConverter<T> {
    fn type_name(&self) -> Cow<'static, str> {
        self.base.type_name()
    }

    fn default_value(&self) -> Result<T, Error> {
        self.base.default_value()
    }

    fn is_nullable(&self) -> bool {
        self.base.is_nullable()
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<T> {
        self.interceptor
            .intercept(value)
            .or_else(|| self.base.from_entry(value))
    }

    fn from_null(&self) -> Option<T> {
        self.interceptor
            .intercept_null()
            .or_else(|| self.base.from_null())
    }

    fn from_entries(
        &self,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<Option<T>, Error> {
        self.base.from_entries(entries, named)
    }

    fn to_entry<'a>(
        &self,
        value: &'a T,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        self.base.to_entry(value, name, builder)
    }

    fn copy(&self, value: &T) -> Result<T, Error> {
        self.base.copy(value)
    }

    fn equal(&self, a: &T, b: &T) -> bool {
        self.base.equal(a, b)
    }

    fn hash_value(&self, value: &T) -> u64 {
        self.base.hash_value(value)
    }

    fn display(&self, value: &T, limit: usize) -> String {
        self.base.display(value, limit)
    }

    fn schema(&self) -> Option<Arc<Schema<T>>> {
        self.base.schema()
    }
}
