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

//! In-memory trees of [`Value`]: maps, lists and scalars.

use crate::converter::Value;
use crate::entry::{
    ConsumerFactory, EnclosedEntries, Entry, EntryBuilder, EntryConsumer, EntryOutput,
    EntryProvider, EntryValue, ProviderFactory,
};
use crate::error::Error;
use indexmap::IndexMap;

/// Emits `value` as one entry, opening a container for lists and maps.
pub(crate) fn emit_value<'a>(
    value: &'a Value,
    name: Option<&str>,
    builder: &mut dyn EntryBuilder<'a>,
) -> Result<Entry, Error> {
    match value {
        Value::Null => builder.null_entry(name),
        Value::Bool(v) => builder.entry(name, EntryValue::Bool(*v)),
        Value::I8(v) => builder.entry(name, EntryValue::I8(*v)),
        Value::I16(v) => builder.entry(name, EntryValue::I16(*v)),
        Value::I32(v) => builder.entry(name, EntryValue::I32(*v)),
        Value::I64(v) => builder.entry(name, EntryValue::I64(*v)),
        Value::F32(v) => builder.entry(name, EntryValue::F32(*v)),
        Value::F64(v) => builder.entry(name, EntryValue::F64(*v)),
        Value::Str(v) => builder.entry(name, EntryValue::Str(v)),
        Value::Bytes(v) => builder.entry(name, EntryValue::Bytes(v)),
        Value::List(items) => builder.start_container(
            name,
            false,
            Some(Box::new(Members::List(items.iter()))),
        ),
        Value::Map(map) => {
            builder.start_container(name, true, Some(Box::new(Members::Map(map.iter()))))
        }
        Value::Object(object) => object.encode(name, builder),
    }
}

enum Members<'a> {
    List(std::slice::Iter<'a, Value>),
    Map(indexmap::map::Iter<'a, String, Value>),
}

impl<'a> EntryProvider<'a> for Members<'a> {
    fn next_entry(
        &mut self,
        builder: &mut dyn EntryBuilder<'a>,
        _want_name: bool,
    ) -> Result<Entry, Error> {
        let next = match self {
            Members::List(items) => items.next().map(|item| (None, item)),
            Members::Map(map) => map.next().map(|(k, v)| (Some(k.as_str()), v)),
        };
        match next {
            Some((name, value)) => emit_value(value, name, builder),
            None => builder.end_container(),
        }
    }
}

/// Provider over a [`Value`] tree.
pub struct ValueProvider<'a> {
    root: Option<&'a Value>,
}

impl<'a> ValueProvider<'a> {
    pub fn new(value: &'a Value) -> Self {
        ValueProvider { root: Some(value) }
    }
}

impl<'a> EntryProvider<'a> for ValueProvider<'a> {
    fn next_entry(
        &mut self,
        builder: &mut dyn EntryBuilder<'a>,
        _want_name: bool,
    ) -> Result<Entry, Error> {
        match self.root.take() {
            Some(value) => emit_value(value, None, builder),
            None => builder.end_container(),
        }
    }
}

enum Slot {
    Root(Option<Value>),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

/// Consumer building a [`Value`] tree.
///
/// Named containers become [`Value::Map`], positional ones
/// [`Value::List`]. At the top level the first item is the output, and
/// no item at all gives [`Value::Null`].
pub struct ValueConsumer {
    slot: Slot,
}

impl Default for ValueConsumer {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueConsumer {
    pub fn new() -> Self {
        ValueConsumer {
            slot: Slot::Root(None),
        }
    }

    /// Consumer for the inside of one container.
    pub fn nested(named: bool) -> Self {
        ValueConsumer {
            slot: if named {
                Slot::Map(IndexMap::new())
            } else {
                Slot::List(Vec::new())
            },
        }
    }

    fn put(&mut self, name: Option<&str>, value: Value) {
        match &mut self.slot {
            Slot::Root(root) => {
                if root.is_none() {
                    *root = Some(value);
                }
            }
            Slot::List(items) => items.push(value),
            Slot::Map(map) => {
                let key = match name {
                    Some(name) => name.to_string(),
                    None => map.len().to_string(),
                };
                map.insert(key, value);
            }
        }
    }
}

impl EntryConsumer for ValueConsumer {
    fn consume_entry(&mut self, name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        self.put(name, Value::from(value));
        Ok(())
    }

    fn consume_null(&mut self, name: Option<&str>) -> Result<(), Error> {
        self.put(name, Value::Null);
        Ok(())
    }

    fn consume_container(
        &mut self,
        name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<(), Error> {
        let value = entries.intercept_output(ValueConsumer::nested(named))?;
        self.put(name, value);
        Ok(())
    }
}

impl EntryOutput for ValueConsumer {
    type Output = Value;

    fn output(self) -> Result<Value, Error> {
        Ok(match self.slot {
            Slot::Root(root) => root.unwrap_or_default(),
            Slot::List(items) => Value::List(items),
            Slot::Map(map) => Value::Map(map),
        })
    }
}

/// Reads and writes [`Value`] trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueFactory;

impl ProviderFactory<Value> for ValueFactory {
    fn make<'a>(&self, input: &'a Value) -> Box<dyn EntryProvider<'a> + 'a> {
        Box::new(ValueProvider::new(input))
    }
}

impl ConsumerFactory for ValueFactory {
    type Consumer = ValueConsumer;

    fn make(&self) -> ValueConsumer {
        ValueConsumer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::produce::produce;

    #[test]
    fn tree_copies_through_the_protocol() {
        let mut inner = IndexMap::new();
        inner.insert("x".to_string(), Value::I32(1));
        inner.insert("y".to_string(), Value::Null);
        let mut outer = IndexMap::new();
        outer.insert("k".to_string(), Value::Map(inner));
        outer.insert(
            "l".to_string(),
            Value::List(vec![Value::Bool(true), Value::List(vec![])]),
        );
        let tree = Value::Map(outer);
        let copied = produce(Box::new(ValueProvider::new(&tree)), ValueConsumer::new()).unwrap();
        assert_eq!(copied, tree);
    }

    #[test]
    fn scalar_root() {
        let tree = Value::from("hi");
        let copied = produce(Box::new(ValueProvider::new(&tree)), ValueConsumer::new()).unwrap();
        assert_eq!(copied, tree);
    }
}
