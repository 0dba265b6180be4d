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

/// Converter of a unit-only enumeration.
///
/// Variants travel by name. Decoding takes the exact name, then the name
/// ignoring ASCII case, then an ordinal given as an integer or as digit
/// text. The first variant is the default.
pub struct EnumConverter<T> {
    name: &'static str,
    variants: &'static [&'static str],
    ordinal_of: fn(&T) -> usize,
    from_ordinal: fn(usize) -> Option<T>,
}

impl<T: 'static> EnumConverter<T> {
    pub fn new(
        name: &'static str,
        variants: &'static [&'static str],
        ordinal_of: fn(&T) -> usize,
        from_ordinal: fn(usize) -> Option<T>,
    ) -> Self {
        EnumConverter {
            name,
            variants,
            ordinal_of,
            from_ordinal,
        }
    }

    pub fn variants(&self) -> &'static [&'static str] {
        self.variants
    }

    fn by_name(&self, text: &str) -> Option<T> {
        let ordinal = self
            .variants
            .iter()
            .position(|v| *v == text)
            .or_else(|| self.variants.iter().position(|v| v.eq_ignore_ascii_case(text)))?;
        (self.from_ordinal)(ordinal)
    }

    fn by_ordinal(&self, ordinal: i64) -> Option<T> {
        usize::try_from(ordinal).ok().and_then(self.from_ordinal)
    }

    fn name_of(&self, value: &T) -> &'static str {
        self.variants
            .get((self.ordinal_of)(value))
            .copied()
            .unwrap_or("?")
    }
}

impl<T: 'static> Converter<T> for EnumConverter<T> {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.name)
    }

    fn default_value(&self) -> Result<T, Error> {
        (self.from_ordinal)(0)
            .ok_or_else(|| Error::resolution(format!("enum {} has no variants", self.name)))
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<T> {
        match value {
            EntryValue::Str(text) => {
                let text = text.trim();
                self.by_name(text)
                    .or_else(|| text.parse::<i64>().ok().and_then(|o| self.by_ordinal(o)))
            }
            EntryValue::Bytes(_) | EntryValue::Bool(_) => None,
            EntryValue::F64(_) | EntryValue::F32(_) => None,
            other => self.by_ordinal(other.as_i64()?),
        }
    }

    fn to_entry<'a>(
        &self,
        value: &'a T,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        builder.entry(name, EntryValue::Str(self.name_of(value)))
    }

    fn copy(&self, value: &T) -> Result<T, Error> {
        let ordinal = (self.ordinal_of)(value);
        (self.from_ordinal)(ordinal).ok_or_else(|| {
            Error::unknown(format!("{} has no variant at ordinal {}", self.name, ordinal))
        })
    }

    fn equal(&self, a: &T, b: &T) -> bool {
        (self.ordinal_of)(a) == (self.ordinal_of)(b)
    }

    fn hash_value(&self, value: &T) -> u64 {
        (self.ordinal_of)(value) as u64
    }

    fn display(&self, value: &T, _limit: usize) -> String {
        self.name_of(value).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Color {
        Red,
        Green,
    }

    fn converter() -> EnumConverter<Color> {
        EnumConverter::new(
            "Color",
            &["Red", "Green"],
            |c| match c {
                Color::Red => 0,
                Color::Green => 1,
            },
            |o| match o {
                0 => Some(Color::Red),
                1 => Some(Color::Green),
                _ => None,
            },
        )
    }

    #[test]
    fn decodes_names_and_ordinals() {
        let c = converter();
        assert_eq!(c.from_entry(EntryValue::Str("Green")), Some(Color::Green));
        assert_eq!(c.from_entry(EntryValue::Str("red")), Some(Color::Red));
        assert_eq!(c.from_entry(EntryValue::Str("1")), Some(Color::Green));
        assert_eq!(c.from_entry(EntryValue::I32(0)), Some(Color::Red));
        assert_eq!(c.from_entry(EntryValue::I32(7)), None);
        assert_eq!(c.from_entry(EntryValue::Str("Blue")), None);
    }

    #[test]
    fn default_is_the_first_variant() {
        assert_eq!(converter().default_value().unwrap(), Color::Red);
        assert_eq!(converter().display(&Color::Green, 1), "Green");
    }
}
