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

use crate::converter::{std_hash, Converter, Convertible};
use crate::entry::{
    EnclosedEntries, Entry, EntryBuilder, EntryConsumer, EntryOutput, EntryValue,
};
use crate::error::Error;
use crate::resolver::TypeRegistry;
use std::borrow::Cow;
use std::sync::Arc;

/// A byte sequence, converted as a single [`EntryValue::Bytes`] entry.
///
/// `Vec<u8>` itself converts as a sequence of small integers; wrap it in
/// `Bytes` to keep it a scalar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Bytes(value)
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Default)]
pub struct BytesConverter;

impl Converter<Bytes> for BytesConverter {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("Bytes")
    }

    fn default_value(&self) -> Result<Bytes, Error> {
        Ok(Bytes::default())
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<Bytes> {
        match value {
            EntryValue::Bytes(bytes) => Some(Bytes(bytes.to_vec())),
            EntryValue::Str(text) => Some(Bytes(text.as_bytes().to_vec())),
            _ => None,
        }
    }

    /// Text formats without a byte kind write bytes as a list of numbers.
    fn from_entries(
        &self,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<Option<Bytes>, Error> {
        if named {
            return Ok(None);
        }
        entries.intercept_output(ByteList::default())
    }

    fn to_entry<'a>(
        &self,
        value: &'a Bytes,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        builder.entry(name, EntryValue::Bytes(&value.0))
    }

    fn copy(&self, value: &Bytes) -> Result<Bytes, Error> {
        Ok(value.clone())
    }

    fn equal(&self, a: &Bytes, b: &Bytes) -> bool {
        a == b
    }

    fn hash_value(&self, value: &Bytes) -> u64 {
        std_hash(&value.0)
    }

    fn display(&self, value: &Bytes, _limit: usize) -> String {
        let mut text = String::with_capacity(value.0.len() * 2);
        for byte in &value.0 {
            text.push_str(&format!("{:02x}", byte));
        }
        text
    }
}

impl Convertible for Bytes {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        registry.leaf(|| BytesConverter)
    }
}

/// Collects a positional list of integers into bytes. Anything else
/// spoils the result.
#[derive(Default)]
struct ByteList {
    bytes: Vec<u8>,
    invalid: bool,
}

impl EntryConsumer for ByteList {
    fn consume_entry(&mut self, _name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        // signed input wraps, so -1 reads as 0xff
        match value {
            EntryValue::Bool(_) => self.invalid = true,
            other => match other.as_i64() {
                Some(v) => self.bytes.push(v as u8),
                None => self.invalid = true,
            },
        }
        Ok(())
    }

    fn consume_null(&mut self, _name: Option<&str>) -> Result<(), Error> {
        self.invalid = true;
        Ok(())
    }

    fn consume_container(
        &mut self,
        _name: Option<&str>,
        _entries: &mut dyn EnclosedEntries,
        _named: bool,
    ) -> Result<(), Error> {
        self.invalid = true;
        Ok(())
    }
}

impl EntryOutput for ByteList {
    type Output = Option<Bytes>;

    fn output(self) -> Result<Option<Bytes>, Error> {
        Ok((!self.invalid).then_some(Bytes(self.bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_from_scalars() {
        let c = BytesConverter;
        assert_eq!(c.from_entry(EntryValue::Bytes(&[1, 2])), Some(Bytes(vec![1, 2])));
        assert_eq!(c.from_entry(EntryValue::Str("ab")), Some(Bytes(b"ab".to_vec())));
        assert_eq!(c.from_entry(EntryValue::I32(1)), None);
        assert_eq!(c.display(&Bytes(vec![0, 255]), 10), "00ff");
    }
}
