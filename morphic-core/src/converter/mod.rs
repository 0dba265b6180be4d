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

//! Converters translate between [`EntryValue`]s and typed values.
//!
//! A [`Converter`] is built once, cached by the
//! [`TypeRegistry`](crate::resolver::TypeRegistry) and shared read-only by
//! every pass that uses it. [`Convertible`] ties a Rust type to the converter
//! the registry resolves for it.

use crate::entry::{EnclosedEntries, Entry, EntryBuilder, EntryValue, Incoming};
use crate::error::Error;
use crate::resolver::TypeRegistry;
use crate::schema::Schema;
use log::{debug, warn};
use std::borrow::Cow;
use std::sync::Arc;

mod any;
mod bool;
mod bytes;
mod datetime;
mod enum_;
mod erased;
mod intercept;
mod list;
mod map;
mod mapped;
mod number;
mod option;
mod string;
mod typed;
mod unsigned_number;

pub use any::{AnyObject, Value, ValueConverter};
pub use self::bool::BoolConverter;
pub use bytes::{Bytes, BytesConverter};
pub use enum_::EnumConverter;
pub use erased::{ConverterId, ErasedConverter};
pub use intercept::{InterceptedConverter, ValueInterceptor};
pub use list::{SeqCollection, SequenceConverter};
pub use map::{MapCollection, MapConverter};
pub use mapped::{MappedConverter, ScalarBase};
pub use number::{parse_number, NumberConverter};
pub use option::OptionConverter;
pub use string::{CharConverter, StringConverter};
pub use typed::{TypedConsumer, TypedProvider};

/// Bidirectional translator between entries and values of `T`.
///
/// Decoding is lenient: `from_entry`, `from_null` and `from_entries` return
/// `None` when the input cannot become a `T`, and [`Converter::decode`]
/// replaces that with [`Converter::default_value`]. Encoding never refuses a
/// value.
pub trait Converter<T: 'static>: Send + Sync + 'static {
    fn type_name(&self) -> Cow<'static, str>;

    /// Zero value used when the input is missing or unusable.
    fn default_value(&self) -> Result<T, Error>;

    fn is_nullable(&self) -> bool {
        false
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<T>;

    fn from_null(&self) -> Option<T> {
        None
    }

    /// Decodes a nested container. Returning `Ok(None)` without touching
    /// `entries` leaves the container to be skipped.
    fn from_entries(
        &self,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<Option<T>, Error> {
        let _ = (entries, named);
        Ok(None)
    }

    fn to_entry<'a>(
        &self,
        value: &'a T,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error>;

    /// Deep copy.
    fn copy(&self, value: &T) -> Result<T, Error>;

    fn equal(&self, a: &T, b: &T) -> bool;

    fn hash_value(&self, value: &T) -> u64;

    /// Human readable rendering; containers stop after `limit` elements.
    fn display(&self, value: &T, limit: usize) -> String;

    /// The schema behind a structural converter.
    fn schema(&self) -> Option<Arc<Schema<T>>> {
        None
    }

    /// Decodes `incoming`, substituting the default value when the input
    /// does not fit.
    fn decode(&self, incoming: Incoming<'_, '_>) -> Result<T, Error> {
        let decoded = match incoming {
            Incoming::Value(value) => {
                let decoded = self.from_entry(value);
                if decoded.is_none() {
                    warn!(
                        "cannot convert {} {} to {}; using default",
                        value.kind(),
                        value,
                        self.type_name()
                    );
                }
                decoded
            }
            Incoming::Null => {
                let decoded = self.from_null();
                if decoded.is_none() {
                    debug!("null for non-nullable {}; using default", self.type_name());
                }
                decoded
            }
            Incoming::Container { entries, named } => {
                let decoded = self.from_entries(entries, named)?;
                if decoded.is_none() {
                    warn!(
                        "cannot convert a {} container to {}; using default",
                        if named { "named" } else { "positional" },
                        self.type_name()
                    );
                }
                decoded
            }
        };
        match decoded {
            Some(value) => Ok(value),
            None => self.default_value(),
        }
    }
}

/// Types the registry knows how to convert.
///
/// Implemented here for scalars, standard containers, `Option`, [`Value`]
/// and chrono dates; `#[derive(Morph)]` implements it for user structs and
/// unit enums.
pub trait Convertible: Sized + 'static {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error>;
}

/// Combines hashes the way sequences and schemas do: `31 * code + item`.
#[inline(always)]
pub fn combine_hash(code: u64, item: u64) -> u64 {
    code.wrapping_mul(31).wrapping_add(item)
}

/// Hash of a value through the std hasher.
pub fn std_hash<H: std::hash::Hash + ?Sized>(value: &H) -> u64 {
    use std::hash::Hasher;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Joins rendered items as `open a, b, ... close`, cut after `limit` items.
pub(crate) fn display_items<I>(items: I, limit: usize, open: &str, close: &str) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut text = String::from(open);
    for (ix, item) in items.into_iter().enumerate() {
        if ix > 0 {
            text.push_str(", ");
        }
        if ix >= limit {
            text.push_str("...");
            break;
        }
        text.push_str(&item);
    }
    text.push_str(close);
    text
}

/// Checks that a converter handed over as erased really converts `T`.
pub(crate) fn expect_typed<T: 'static>(
    converter: &ErasedConverter,
) -> Result<Arc<dyn Converter<T>>, Error> {
    converter.typed::<T>().ok_or_else(|| {
        Error::type_mismatch(
            std::any::type_name::<T>(),
            converter.value_type_name().to_string(),
        )
    })
}
