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

use crate::converter::{Converter, Convertible, ErasedConverter};
use crate::entry::{EnclosedEntries, Entry, EntryBuilder, EntryValue, Incoming};
use crate::error::Error;
use crate::resolver::{Shape, TypeRegistry};
use log::warn;
use std::borrow::Cow;
use std::sync::Arc;

/// Nullable wrapper around the converter of `T`.
///
/// The default value is `None`, so input the inner converter refuses
/// decodes to `None` instead of the inner default.
pub struct OptionConverter<T: 'static> {
    inner: Arc<dyn Converter<T>>,
}

impl<T: 'static> OptionConverter<T> {
    pub fn new(inner: Arc<dyn Converter<T>>) -> Self {
        OptionConverter { inner }
    }
}

impl<T: 'static> Converter<Option<T>> for OptionConverter<T> {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("Option<{}>", self.inner.type_name()))
    }

    fn default_value(&self) -> Result<Option<T>, Error> {
        Ok(None)
    }

    fn is_nullable(&self) -> bool {
        true
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<Option<T>> {
        self.inner.from_entry(value).map(Some)
    }

    fn from_null(&self) -> Option<Option<T>> {
        Some(None)
    }

    fn from_entries(
        &self,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<Option<Option<T>>, Error> {
        Ok(self.inner.from_entries(entries, named)?.map(Some))
    }

    fn to_entry<'a>(
        &self,
        value: &'a Option<T>,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        match value {
            Some(value) => self.inner.to_entry(value, name, builder),
            None => builder.null_entry(name),
        }
    }

    fn copy(&self, value: &Option<T>) -> Result<Option<T>, Error> {
        value.as_ref().map(|v| self.inner.copy(v)).transpose()
    }

    fn equal(&self, a: &Option<T>, b: &Option<T>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.inner.equal(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn hash_value(&self, value: &Option<T>) -> u64 {
        value.as_ref().map_or(0, |v| self.inner.hash_value(v))
    }

    fn display(&self, value: &Option<T>, limit: usize) -> String {
        match value {
            Some(v) => self.inner.display(v, limit),
            None => "null".to_string(),
        }
    }

    fn decode(&self, incoming: Incoming<'_, '_>) -> Result<Option<T>, Error> {
        match incoming {
            Incoming::Null => Ok(None),
            Incoming::Value(value) => match self.inner.from_entry(value) {
                Some(v) => Ok(Some(v)),
                None => {
                    warn!(
                        "cannot convert {} {} to {}; using null",
                        value.kind(),
                        value,
                        self.inner.type_name()
                    );
                    Ok(None)
                }
            },
            Incoming::Container { entries, named } => {
                Ok(self.inner.from_entries(entries, named)?.map(Some).unwrap_or_else(|| {
                    warn!(
                        "cannot convert a container to {}; using null",
                        self.inner.type_name()
                    );
                    None
                }))
            }
        }
    }
}

impl<T: Convertible> Convertible for Option<T> {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        let inner = T::resolve(registry)?;
        let args = [ErasedConverter::new(inner.clone())];
        registry.get_or_build(Shape::named::<Option<()>>("Option"), &args, move |_| {
            Ok(Arc::new(OptionConverter::new(inner)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::NumberConverter;

    #[test]
    fn refused_input_becomes_none() {
        let c = OptionConverter::new(Arc::new(NumberConverter::<i32>::new()));
        assert_eq!(c.decode(Incoming::Value(EntryValue::Str("abc"))).unwrap(), None);
        assert_eq!(c.decode(Incoming::Value(EntryValue::Str("4"))).unwrap(), Some(4));
        assert_eq!(c.decode(Incoming::Null).unwrap(), None);
        assert!(c.is_nullable());
    }
}
