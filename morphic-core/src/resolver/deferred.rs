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

use super::type_registry::{RegistryInner, TypeKey};
use crate::converter::{expect_typed, Converter};
use crate::entry::{EnclosedEntries, Entry, EntryBuilder, EntryValue, Incoming};
use crate::error::Error;
use crate::schema::Schema;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock, Weak};

/// Stand-in for a converter that was still being built when it was asked
/// for. Every operation forwards to the cached converter of `key`.
///
/// Only weak references are kept, so a self-referencing schema does not
/// keep itself alive.
pub(crate) struct DeferredConverter<T: 'static> {
    registry: Weak<RegistryInner>,
    key: TypeKey,
    bound: OnceLock<Weak<dyn Converter<T>>>,
}

impl<T: 'static> DeferredConverter<T> {
    pub(crate) fn new(registry: Weak<RegistryInner>, key: TypeKey) -> Self {
        DeferredConverter {
            registry,
            key,
            bound: OnceLock::new(),
        }
    }

    fn target(&self) -> Result<Arc<dyn Converter<T>>, Error> {
        if let Some(target) = self.bound.get().and_then(Weak::upgrade) {
            return Ok(target);
        }
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| Error::resolution("type registry is gone"))?;
        let cached = registry.lookup(&self.key).ok_or_else(|| {
            Error::resolution(format!(
                "{} is referenced but was never built",
                self.key.shape().name()
            ))
        })?;
        let target = expect_typed::<T>(&cached)?;
        let _ = self.bound.set(Arc::downgrade(&target));
        Ok(target)
    }
}

impl<T: 'static> Converter<T> for DeferredConverter<T> {
    fn type_name(&self) -> Cow<'static, str> {
        match self.target() {
            Ok(target) => target.type_name(),
            Err(_) => Cow::Borrowed(self.key.shape().name()),
        }
    }

    fn default_value(&self) -> Result<T, Error> {
        self.target()?.default_value()
    }

    fn is_nullable(&self) -> bool {
        self.target().is_ok_and(|target| target.is_nullable())
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<T> {
        self.target().ok()?.from_entry(value)
    }

    fn from_null(&self) -> Option<T> {
        self.target().ok()?.from_null()
    }

    fn from_entries(
        &self,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<Option<T>, Error> {
        self.target()?.from_entries(entries, named)
    }

    fn to_entry<'a>(
        &self,
        value: &'a T,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        self.target()?.to_entry(value, name, builder)
    }

    fn copy(&self, value: &T) -> Result<T, Error> {
        self.target()?.copy(value)
    }

    fn equal(&self, a: &T, b: &T) -> bool {
        self.target().is_ok_and(|target| target.equal(a, b))
    }

    fn hash_value(&self, value: &T) -> u64 {
        self.target().map_or(0, |target| target.hash_value(value))
    }

    fn display(&self, value: &T, limit: usize) -> String {
        self.target()
            .map_or_else(|_| "?".to_string(), |target| target.display(value, limit))
    }

    fn schema(&self) -> Option<Arc<Schema<T>>> {
        self.target().ok()?.schema()
    }

    fn decode(&self, incoming: Incoming<'_, '_>) -> Result<T, Error> {
        self.target()?.decode(incoming)
    }
}
