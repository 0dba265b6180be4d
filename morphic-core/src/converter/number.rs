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
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

/// Signed integer and floating point types with a native entry kind.
pub trait Number: Copy + PartialEq + Default + FromStr + Send + Sync + 'static {
    const NAME: &'static str;

    fn from_i64(value: i64) -> Self;

    fn from_f64(value: f64) -> Self;

    fn entry_value(self) -> EntryValue<'static>;

    fn hash_bits(self) -> u64;

    fn render(self) -> String;
}

macro_rules! impl_int_number {
    ($ty:ty, $variant:ident) => {
        impl Number for $ty {
            const NAME: &'static str = stringify!($ty);

            #[inline(always)]
            fn from_i64(value: i64) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn entry_value(self) -> EntryValue<'static> {
                EntryValue::$variant(self)
            }

            #[inline(always)]
            fn hash_bits(self) -> u64 {
                self as i64 as u64
            }

            fn render(self) -> String {
                self.to_string()
            }
        }
    };
}

macro_rules! impl_float_number {
    ($ty:ty, $variant:ident) => {
        impl Number for $ty {
            const NAME: &'static str = stringify!($ty);

            #[inline(always)]
            fn from_i64(value: i64) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn entry_value(self) -> EntryValue<'static> {
                EntryValue::$variant(self)
            }

            #[inline(always)]
            fn hash_bits(self) -> u64 {
                self.to_bits() as u64
            }

            fn render(self) -> String {
                format!("{:?}", self)
            }
        }
    };
}

impl_int_number!(i8, I8);
impl_int_number!(i16, I16);
impl_int_number!(i32, I32);
impl_int_number!(i64, I64);
impl_float_number!(f32, F32);
impl_float_number!(f64, F64);

/// Parses text as `N`: exact syntax first, then as a float truncated to `N`.
pub fn parse_number<N: Number>(text: &str) -> Option<N> {
    let text = text.trim();
    if let Ok(value) = text.parse::<N>() {
        return Some(value);
    }
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(N::from_f64)
}

/// Converter for the signed numeric types.
///
/// Every numeric entry converts with `as` semantics, booleans become 1 or 0,
/// and strings go through [`parse_number`]. Byte sequences and containers
/// do not convert.
pub struct NumberConverter<N> {
    _marker: PhantomData<fn() -> N>,
}

impl<N: Number> NumberConverter<N> {
    pub fn new() -> Self {
        NumberConverter {
            _marker: PhantomData,
        }
    }
}

impl<N: Number> Default for NumberConverter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Number> Converter<N> for NumberConverter<N> {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(N::NAME)
    }

    fn default_value(&self) -> Result<N, Error> {
        Ok(N::default())
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<N> {
        match value {
            EntryValue::Str(text) => parse_number(text),
            EntryValue::F64(v) => Some(N::from_f64(v)),
            EntryValue::F32(v) => Some(N::from_f64(v as f64)),
            EntryValue::Bytes(_) => None,
            other => other.as_i64().map(N::from_i64),
        }
    }

    fn to_entry<'a>(
        &self,
        value: &'a N,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        builder.entry(name, value.entry_value())
    }

    fn copy(&self, value: &N) -> Result<N, Error> {
        Ok(*value)
    }

    fn equal(&self, a: &N, b: &N) -> bool {
        a == b
    }

    fn hash_value(&self, value: &N) -> u64 {
        value.hash_bits()
    }

    fn display(&self, value: &N, _limit: usize) -> String {
        value.render()
    }
}

macro_rules! impl_convertible_number {
    ($($ty:ty),*) => {
        $(
            impl Convertible for $ty {
                fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
                    registry.leaf(NumberConverter::<$ty>::new)
                }
            }
        )*
    };
}

impl_convertible_number!(i8, i16, i32, i64, f32, f64);
