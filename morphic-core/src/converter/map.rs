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

use crate::converter::{combine_hash, display_items, Converter, Convertible, ErasedConverter};
use crate::entry::{
    EnclosedEntries, Entry, EntryBuilder, EntryConsumer, EntryOutput, EntryProvider, EntryValue,
    Incoming,
};
use crate::error::Error;
use crate::resolver::{Shape, TypeRegistry};
use indexmap::IndexMap;
use log::warn;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

/// Key/value collections converted as a named container, one entry per
/// key.
pub trait MapCollection<K: 'static, V: 'static>: Sized + 'static {
    const NAME: &'static str;

    fn empty() -> Self;

    fn pairs<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a>;

    fn lookup(&self, key: &K) -> Option<&V>;

    fn put(&mut self, key: K, value: V);

    fn size(&self) -> usize;
}

impl<K: Eq + Hash + 'static, V: 'static> MapCollection<K, V> for HashMap<K, V> {
    const NAME: &'static str = "HashMap";

    fn empty() -> Self {
        HashMap::new()
    }

    fn pairs<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a> {
        Box::new(self.iter())
    }

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<K: Ord + 'static, V: 'static> MapCollection<K, V> for BTreeMap<K, V> {
    const NAME: &'static str = "BTreeMap";

    fn empty() -> Self {
        BTreeMap::new()
    }

    fn pairs<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a> {
        Box::new(self.iter())
    }

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<K: Eq + Hash + 'static, V: 'static> MapCollection<K, V> for IndexMap<K, V> {
    const NAME: &'static str = "IndexMap";

    fn empty() -> Self {
        IndexMap::new()
    }

    fn pairs<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a> {
        Box::new(self.iter())
    }

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn size(&self) -> usize {
        self.len()
    }
}

/// Converter of a [`MapCollection`].
///
/// Keys travel as entry names: they are rendered with the key converter's
/// `display` and read back through its `from_entry` on a string entry.
/// Entries whose name does not convert to a key are dropped.
pub struct MapConverter<M, K: 'static, V: 'static> {
    key: Arc<dyn Converter<K>>,
    value: Arc<dyn Converter<V>>,
    _marker: PhantomData<fn() -> M>,
}

impl<M: MapCollection<K, V>, K: 'static, V: 'static> MapConverter<M, K, V> {
    pub fn new(key: Arc<dyn Converter<K>>, value: Arc<dyn Converter<V>>) -> Self {
        MapConverter {
            key,
            value,
            _marker: PhantomData,
        }
    }
}

impl<M: MapCollection<K, V>, K: 'static, V: 'static> Converter<M> for MapConverter<M, K, V> {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!(
            "{}<{}, {}>",
            M::NAME,
            self.key.type_name(),
            self.value.type_name()
        ))
    }

    fn default_value(&self) -> Result<M, Error> {
        Ok(M::empty())
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<M> {
        match value {
            EntryValue::Str(text) if text.trim().is_empty() => Some(M::empty()),
            _ => None,
        }
    }

    fn from_entries(
        &self,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<Option<M>, Error> {
        if !named {
            return Ok(None);
        }
        let map = entries.intercept_output(MapConsumer::<M, K, V> {
            key: self.key.clone(),
            value: self.value.clone(),
            map: M::empty(),
        })?;
        Ok(Some(map))
    }

    fn to_entry<'a>(
        &self,
        value: &'a M,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        let provider = MapProvider {
            pairs: value.pairs(),
            key: self.key.clone(),
            value: self.value.clone(),
        };
        builder.start_container(name, true, Some(Box::new(provider)))
    }

    fn copy(&self, value: &M) -> Result<M, Error> {
        let mut copied = M::empty();
        for (k, v) in value.pairs() {
            copied.put(self.key.copy(k)?, self.value.copy(v)?);
        }
        Ok(copied)
    }

    fn equal(&self, a: &M, b: &M) -> bool {
        a.size() == b.size()
            && a.pairs().all(|(k, v)| {
                b.lookup(k)
                    .is_some_and(|other| self.value.equal(v, other))
            })
    }

    fn hash_value(&self, value: &M) -> u64 {
        value.pairs().fold(0u64, |code, (k, v)| {
            let pair = combine_hash(self.key.hash_value(k), self.value.hash_value(v));
            code.wrapping_add(pair)
        })
    }

    fn display(&self, value: &M, limit: usize) -> String {
        display_items(
            value.pairs().map(|(k, v)| {
                format!(
                    "{}={}",
                    self.key.display(k, limit),
                    self.value.display(v, limit)
                )
            }),
            limit,
            "{",
            "}",
        )
    }
}

struct MapProvider<'a, K: 'static, V: 'static> {
    pairs: Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a>,
    key: Arc<dyn Converter<K>>,
    value: Arc<dyn Converter<V>>,
}

impl<'a, K: 'static, V: 'static> EntryProvider<'a> for MapProvider<'a, K, V> {
    fn next_entry(
        &mut self,
        builder: &mut dyn EntryBuilder<'a>,
        _want_name: bool,
    ) -> Result<Entry, Error> {
        match self.pairs.next() {
            Some((k, v)) => {
                let name = self.key.display(k, usize::MAX);
                self.value.to_entry(v, Some(&name), builder)
            }
            None => builder.end_container(),
        }
    }
}

struct MapConsumer<M, K: 'static, V: 'static> {
    key: Arc<dyn Converter<K>>,
    value: Arc<dyn Converter<V>>,
    map: M,
}

impl<M: MapCollection<K, V>, K: 'static, V: 'static> MapConsumer<M, K, V> {
    fn key_of(&self, name: Option<&str>) -> Option<K> {
        let name = name?;
        let key = self.key.from_entry(EntryValue::Str(name));
        if key.is_none() {
            warn!(
                "map key {:?} does not convert to {}; entry dropped",
                name,
                self.key.type_name()
            );
        }
        key
    }
}

impl<M: MapCollection<K, V>, K: 'static, V: 'static> EntryConsumer for MapConsumer<M, K, V> {
    fn consume_entry(&mut self, name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        if let Some(key) = self.key_of(name) {
            let value = self.value.decode(Incoming::Value(value))?;
            self.map.put(key, value);
        }
        Ok(())
    }

    fn consume_null(&mut self, name: Option<&str>) -> Result<(), Error> {
        if let Some(key) = self.key_of(name) {
            let value = self.value.decode(Incoming::Null)?;
            self.map.put(key, value);
        }
        Ok(())
    }

    fn consume_container(
        &mut self,
        name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<(), Error> {
        if let Some(key) = self.key_of(name) {
            let value = self.value.decode(Incoming::Container { entries, named })?;
            self.map.put(key, value);
        }
        Ok(())
    }
}

impl<M: MapCollection<K, V>, K: 'static, V: 'static> EntryOutput for MapConsumer<M, K, V> {
    type Output = M;

    fn output(self) -> Result<M, Error> {
        Ok(self.map)
    }
}

fn resolve_map<M, K, V>(registry: &TypeRegistry, shape: Shape) -> Result<Arc<dyn Converter<M>>, Error>
where
    M: MapCollection<K, V>,
    K: Convertible,
    V: Convertible,
{
    let key = K::resolve(registry)?;
    let value = V::resolve(registry)?;
    let args = [
        ErasedConverter::new(key.clone()),
        ErasedConverter::new(value.clone()),
    ];
    registry.get_or_build(shape, &args, move |_| {
        Ok(Arc::new(MapConverter::<M, K, V>::new(key, value)) as Arc<dyn Converter<M>>)
    })
}

impl<K: Convertible + Eq + Hash, V: Convertible> Convertible for HashMap<K, V> {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        resolve_map::<Self, K, V>(registry, Shape::named::<HashMap<(), ()>>("HashMap"))
    }
}

impl<K: Convertible + Ord, V: Convertible> Convertible for BTreeMap<K, V> {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        resolve_map::<Self, K, V>(registry, Shape::named::<BTreeMap<(), ()>>("BTreeMap"))
    }
}

impl<K: Convertible + Eq + Hash, V: Convertible> Convertible for IndexMap<K, V> {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        resolve_map::<Self, K, V>(registry, Shape::named::<IndexMap<(), ()>>("IndexMap"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{NumberConverter, StringConverter};

    #[test]
    fn equality_ignores_insertion_order() {
        let c: MapConverter<IndexMap<String, i32>, String, i32> =
            MapConverter::new(Arc::new(StringConverter), Arc::new(NumberConverter::<i32>::new()));
        let mut a = IndexMap::new();
        a.insert("x".to_string(), 1);
        a.insert("y".to_string(), 2);
        let mut b = IndexMap::new();
        b.insert("y".to_string(), 2);
        b.insert("x".to_string(), 1);
        assert!(c.equal(&a, &b));
        assert_eq!(c.hash_value(&a), c.hash_value(&b));
        assert_eq!(c.display(&a, 10), "{x=1, y=2}");
    }
}
