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

//! Unsigned integers travel as the next wider signed entry kind. Values of
//! `u64` beyond `i64::MAX` travel as decimal text.

use crate::converter::{Converter, Convertible};
use crate::entry::{Entry, EntryBuilder, EntryValue};
use crate::error::Error;
use crate::resolver::TypeRegistry;
use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

pub trait Unsigned: Copy + PartialEq + Default + TryFrom<u64> + Into<u64> + Send + Sync + 'static {
    const NAME: &'static str;

    fn to_entry_value(self) -> Option<EntryValue<'static>>;
}

impl Unsigned for u8 {
    const NAME: &'static str = "u8";

    fn to_entry_value(self) -> Option<EntryValue<'static>> {
        Some(EntryValue::I16(self as i16))
    }
}

impl Unsigned for u16 {
    const NAME: &'static str = "u16";

    fn to_entry_value(self) -> Option<EntryValue<'static>> {
        Some(EntryValue::I32(self as i32))
    }
}

impl Unsigned for u32 {
    const NAME: &'static str = "u32";

    fn to_entry_value(self) -> Option<EntryValue<'static>> {
        Some(EntryValue::I64(self as i64))
    }
}

impl Unsigned for u64 {
    const NAME: &'static str = "u64";

    fn to_entry_value(self) -> Option<EntryValue<'static>> {
        i64::try_from(self).ok().map(EntryValue::I64)
    }
}

pub struct UnsignedConverter<N> {
    _marker: PhantomData<fn() -> N>,
}

impl<N: Unsigned> UnsignedConverter<N> {
    pub fn new() -> Self {
        UnsignedConverter {
            _marker: PhantomData,
        }
    }
}

impl<N: Unsigned> Converter<N> for UnsignedConverter<N> {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(N::NAME)
    }

    fn default_value(&self) -> Result<N, Error> {
        Ok(N::default())
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<N> {
        let wide = match value {
            EntryValue::Str(text) => {
                let text = text.trim();
                text.parse::<u64>().ok().or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite() && *v >= 0.0)
                        .map(|v| v as u64)
                })?
            }
            EntryValue::Bytes(_) => return None,
            EntryValue::F64(v) if v >= 0.0 => v as u64,
            EntryValue::F32(v) if v >= 0.0 => v as u64,
            other => u64::try_from(other.as_i64()?).ok()?,
        };
        N::try_from(wide).ok()
    }

    fn to_entry<'a>(
        &self,
        value: &'a N,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        match value.to_entry_value() {
            Some(entry) => builder.entry(name, entry),
            None => {
                let text = Into::<u64>::into(*value).to_string();
                builder.entry(name, EntryValue::Str(&text))
            }
        }
    }

    fn copy(&self, value: &N) -> Result<N, Error> {
        Ok(*value)
    }

    fn equal(&self, a: &N, b: &N) -> bool {
        a == b
    }

    fn hash_value(&self, value: &N) -> u64 {
        Into::<u64>::into(*value)
    }

    fn display(&self, value: &N, _limit: usize) -> String {
        Into::<u64>::into(*value).to_string()
    }
}

macro_rules! impl_convertible_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Convertible for $ty {
                fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
                    registry.leaf(UnsignedConverter::<$ty>::new)
                }
            }
        )*
    };
}

impl_convertible_unsigned!(u8, u16, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_numbers_do_not_convert() {
        let converter = UnsignedConverter::<u8>::new();
        assert_eq!(converter.from_entry(EntryValue::I32(-1)), None);
        assert_eq!(converter.from_entry(EntryValue::I32(300)), None);
        assert_eq!(converter.from_entry(EntryValue::Str("200")), Some(200));
    }

    #[test]
    fn large_u64_uses_text() {
        assert_eq!(u64::MAX.to_entry_value(), None);
        let converter = UnsignedConverter::<u64>::new();
        assert_eq!(
            converter.from_entry(EntryValue::Str("18446744073709551615")),
            Some(u64::MAX)
        );
    }
}
