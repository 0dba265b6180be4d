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
use crate::entry::{Entry, EntryBuilder, Incoming};
use crate::error::Error;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Identity of a converter instance, stable for its whole lifetime.
///
/// Registry keys are built from these, so two lookups with the same shape
/// and the same argument converters hit the same cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConverterId(usize);

impl ConverterId {
    pub fn of<T: 'static>(converter: &Arc<dyn Converter<T>>) -> Self {
        ConverterId(Arc::as_ptr(converter) as *const () as usize)
    }
}

/// Operations on a converter whose value type is only known at run time.
trait DynConverter: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> Cow<'static, str>;

    fn is_nullable(&self) -> bool;

    fn decode_boxed(&self, incoming: Incoming<'_, '_>) -> Result<Box<dyn Any>, Error>;

    fn default_boxed(&self) -> Result<Box<dyn Any>, Error>;

    fn encode<'a>(
        &self,
        value: &'a dyn Any,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error>;

    fn equal(&self, a: &dyn Any, b: &dyn Any) -> bool;

    fn hash_value(&self, value: &dyn Any) -> u64;

    fn display(&self, value: &dyn Any, limit: usize) -> String;
}

struct Typed<T: 'static>(Arc<dyn Converter<T>>);

impl<T: 'static> Typed<T> {
    fn cast<'v>(&self, value: &'v dyn Any) -> Result<&'v T, Error> {
        value.downcast_ref::<T>().ok_or_else(|| {
            Error::type_mismatch(std::any::type_name::<T>(), "a value of another type")
        })
    }
}

impl<T: 'static> DynConverter for Typed<T> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn type_name(&self) -> Cow<'static, str> {
        self.0.type_name()
    }

    fn is_nullable(&self) -> bool {
        self.0.is_nullable()
    }

    fn decode_boxed(&self, incoming: Incoming<'_, '_>) -> Result<Box<dyn Any>, Error> {
        Ok(Box::new(self.0.decode(incoming)?))
    }

    fn default_boxed(&self) -> Result<Box<dyn Any>, Error> {
        Ok(Box::new(self.0.default_value()?))
    }

    fn encode<'a>(
        &self,
        value: &'a dyn Any,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        let value = self.cast(value)?;
        self.0.to_entry(value, name, builder)
    }

    fn equal(&self, a: &dyn Any, b: &dyn Any) -> bool {
        match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
            (Some(a), Some(b)) => self.0.equal(a, b),
            _ => false,
        }
    }

    fn hash_value(&self, value: &dyn Any) -> u64 {
        value
            .downcast_ref::<T>()
            .map_or(0, |value| self.0.hash_value(value))
    }

    fn display(&self, value: &dyn Any, limit: usize) -> String {
        value
            .downcast_ref::<T>()
            .map_or_else(|| "?".to_string(), |value| self.0.display(value, limit))
    }
}

/// A converter with its value type erased.
///
/// Used where converters of different value types sit side by side: registry
/// entries, generic arguments of a cache key, schema fields and constructor
/// parameters, and [`AnyObject`](crate::converter::AnyObject) payloads.
#[derive(Clone)]
pub struct ErasedConverter {
    id: ConverterId,
    value_type: TypeId,
    value_type_name: &'static str,
    inner: Arc<dyn DynConverter>,
}

impl ErasedConverter {
    pub fn new<T: 'static>(converter: Arc<dyn Converter<T>>) -> Self {
        ErasedConverter {
            id: ConverterId::of(&converter),
            value_type: TypeId::of::<T>(),
            value_type_name: std::any::type_name::<T>(),
            inner: Arc::new(Typed(converter)),
        }
    }

    #[inline(always)]
    pub fn id(&self) -> ConverterId {
        self.id
    }

    #[inline(always)]
    pub fn value_type(&self) -> TypeId {
        self.value_type
    }

    pub fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }

    pub fn type_name(&self) -> Cow<'static, str> {
        self.inner.type_name()
    }

    pub fn is_nullable(&self) -> bool {
        self.inner.is_nullable()
    }

    /// The typed converter, if `T` is its value type.
    pub fn typed<T: 'static>(&self) -> Option<Arc<dyn Converter<T>>> {
        self.inner
            .as_any()
            .downcast_ref::<Arc<dyn Converter<T>>>()
            .cloned()
    }

    pub fn decode_boxed(&self, incoming: Incoming<'_, '_>) -> Result<Box<dyn Any>, Error> {
        self.inner.decode_boxed(incoming)
    }

    pub fn default_boxed(&self) -> Result<Box<dyn Any>, Error> {
        self.inner.default_boxed()
    }

    pub fn encode<'a>(
        &self,
        value: &'a dyn Any,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        self.inner.encode(value, name, builder)
    }

    pub fn equal(&self, a: &dyn Any, b: &dyn Any) -> bool {
        self.inner.equal(a, b)
    }

    pub fn hash_value(&self, value: &dyn Any) -> u64 {
        self.inner.hash_value(value)
    }

    pub fn display(&self, value: &dyn Any, limit: usize) -> String {
        self.inner.display(value, limit)
    }
}

impl PartialEq for ErasedConverter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ErasedConverter {}

impl fmt::Debug for ErasedConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedConverter")
            .field("id", &self.id)
            .field("type", &self.type_name())
            .finish()
    }
}
