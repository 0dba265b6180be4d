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
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

/// Collections converted as a positional container of elements.
pub trait SeqCollection<E: 'static>: Sized + 'static {
    const NAME: &'static str;

    /// Whether element order is part of the value.
    const ORDERED: bool = true;

    fn empty() -> Self;

    fn items<'a>(&'a self) -> Box<dyn Iterator<Item = &'a E> + 'a>;

    fn push_item(&mut self, item: E);

    fn size(&self) -> usize;
}

impl<E: 'static> SeqCollection<E> for Vec<E> {
    const NAME: &'static str = "Vec";

    fn empty() -> Self {
        Vec::new()
    }

    fn items<'a>(&'a self) -> Box<dyn Iterator<Item = &'a E> + 'a> {
        Box::new(self.iter())
    }

    fn push_item(&mut self, item: E) {
        self.push(item);
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<E: 'static> SeqCollection<E> for VecDeque<E> {
    const NAME: &'static str = "VecDeque";

    fn empty() -> Self {
        VecDeque::new()
    }

    fn items<'a>(&'a self) -> Box<dyn Iterator<Item = &'a E> + 'a> {
        Box::new(self.iter())
    }

    fn push_item(&mut self, item: E) {
        self.push_back(item);
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<E: Eq + Hash + 'static> SeqCollection<E> for HashSet<E> {
    const NAME: &'static str = "HashSet";
    const ORDERED: bool = false;

    fn empty() -> Self {
        HashSet::new()
    }

    fn items<'a>(&'a self) -> Box<dyn Iterator<Item = &'a E> + 'a> {
        Box::new(self.iter())
    }

    fn push_item(&mut self, item: E) {
        self.insert(item);
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<E: Ord + 'static> SeqCollection<E> for BTreeSet<E> {
    const NAME: &'static str = "BTreeSet";

    fn empty() -> Self {
        BTreeSet::new()
    }

    fn items<'a>(&'a self) -> Box<dyn Iterator<Item = &'a E> + 'a> {
        Box::new(self.iter())
    }

    fn push_item(&mut self, item: E) {
        self.insert(item);
    }

    fn size(&self) -> usize {
        self.len()
    }
}

/// Converter of a [`SeqCollection`] over an element converter.
///
/// Decoding accepts named and positional containers alike and ignores the
/// names. An empty string decodes to an empty collection, since text
/// formats may not tell an empty container from empty text.
pub struct SequenceConverter<C, E: 'static> {
    element: Arc<dyn Converter<E>>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: SeqCollection<E>, E: 'static> SequenceConverter<C, E> {
    pub fn new(element: Arc<dyn Converter<E>>) -> Self {
        SequenceConverter {
            element,
            _marker: PhantomData,
        }
    }

    pub fn element(&self) -> &Arc<dyn Converter<E>> {
        &self.element
    }
}

impl<C: SeqCollection<E>, E: 'static> Converter<C> for SequenceConverter<C, E> {
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{}<{}>", C::NAME, self.element.type_name()))
    }

    fn default_value(&self) -> Result<C, Error> {
        Ok(C::empty())
    }

    fn from_entry(&self, value: EntryValue<'_>) -> Option<C> {
        match value {
            EntryValue::Str(text) if text.trim().is_empty() => Some(C::empty()),
            _ => None,
        }
    }

    fn from_entries(
        &self,
        entries: &mut dyn EnclosedEntries,
        _named: bool,
    ) -> Result<Option<C>, Error> {
        let items = entries.intercept_output(SequenceConsumer::<C, E> {
            element: self.element.clone(),
            items: C::empty(),
        })?;
        Ok(Some(items))
    }

    fn to_entry<'a>(
        &self,
        value: &'a C,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        let provider = SequenceProvider {
            items: value.items(),
            element: self.element.clone(),
        };
        builder.start_container(name, false, Some(Box::new(provider)))
    }

    fn copy(&self, value: &C) -> Result<C, Error> {
        let mut copied = C::empty();
        for item in value.items() {
            copied.push_item(self.element.copy(item)?);
        }
        Ok(copied)
    }

    fn equal(&self, a: &C, b: &C) -> bool {
        if a.size() != b.size() {
            return false;
        }
        if C::ORDERED {
            a.items()
                .zip(b.items())
                .all(|(x, y)| self.element.equal(x, y))
        } else {
            a.items()
                .all(|x| b.items().any(|y| self.element.equal(x, y)))
        }
    }

    fn hash_value(&self, value: &C) -> u64 {
        if C::ORDERED {
            value
                .items()
                .fold(1, |code, item| combine_hash(code, self.element.hash_value(item)))
        } else {
            value
                .items()
                .fold(0u64, |code, item| code.wrapping_add(self.element.hash_value(item)))
        }
    }

    fn display(&self, value: &C, limit: usize) -> String {
        display_items(
            value.items().map(|item| self.element.display(item, limit)),
            limit,
            "[",
            "]",
        )
    }
}

/// Emits the elements of a collection, one per step.
struct SequenceProvider<'a, E: 'static> {
    items: Box<dyn Iterator<Item = &'a E> + 'a>,
    element: Arc<dyn Converter<E>>,
}

impl<'a, E: 'static> EntryProvider<'a> for SequenceProvider<'a, E> {
    fn next_entry(
        &mut self,
        builder: &mut dyn EntryBuilder<'a>,
        _want_name: bool,
    ) -> Result<Entry, Error> {
        match self.items.next() {
            Some(item) => self.element.to_entry(item, None, builder),
            None => builder.end_container(),
        }
    }
}

struct SequenceConsumer<C, E: 'static> {
    element: Arc<dyn Converter<E>>,
    items: C,
}

impl<C: SeqCollection<E>, E: 'static> EntryConsumer for SequenceConsumer<C, E> {
    fn consume_entry(&mut self, _name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        let item = self.element.decode(Incoming::Value(value))?;
        self.items.push_item(item);
        Ok(())
    }

    fn consume_null(&mut self, _name: Option<&str>) -> Result<(), Error> {
        let item = self.element.decode(Incoming::Null)?;
        self.items.push_item(item);
        Ok(())
    }

    fn consume_container(
        &mut self,
        _name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<(), Error> {
        let item = self.element.decode(Incoming::Container { entries, named })?;
        self.items.push_item(item);
        Ok(())
    }
}

impl<C: SeqCollection<E>, E: 'static> EntryOutput for SequenceConsumer<C, E> {
    type Output = C;

    fn output(self) -> Result<C, Error> {
        Ok(self.items)
    }
}

fn resolve_sequence<C, E>(registry: &TypeRegistry, shape: Shape) -> Result<Arc<dyn Converter<C>>, Error>
where
    C: SeqCollection<E>,
    E: Convertible,
{
    let element = E::resolve(registry)?;
    let args = [ErasedConverter::new(element.clone())];
    registry.get_or_build(shape, &args, move |_| {
        Ok(Arc::new(SequenceConverter::<C, E>::new(element)) as Arc<dyn Converter<C>>)
    })
}

impl<E: Convertible> Convertible for Vec<E> {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        resolve_sequence::<Self, E>(registry, Shape::named::<Vec<()>>("Vec"))
    }
}

impl<E: Convertible> Convertible for VecDeque<E> {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        resolve_sequence::<Self, E>(registry, Shape::named::<VecDeque<()>>("VecDeque"))
    }
}

impl<E: Convertible + Eq + Hash> Convertible for HashSet<E> {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        resolve_sequence::<Self, E>(registry, Shape::named::<HashSet<()>>("HashSet"))
    }
}

impl<E: Convertible + Ord> Convertible for BTreeSet<E> {
    fn resolve(registry: &TypeRegistry) -> Result<Arc<dyn Converter<Self>>, Error> {
        resolve_sequence::<Self, E>(registry, Shape::named::<BTreeSet<()>>("BTreeSet"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::NumberConverter;

    fn ints() -> SequenceConverter<Vec<i32>, i32> {
        SequenceConverter::new(Arc::new(NumberConverter::<i32>::new()))
    }

    #[test]
    fn ordered_equality_and_hash() {
        let c = ints();
        assert!(c.equal(&vec![1, 2], &vec![1, 2]));
        assert!(!c.equal(&vec![1, 2], &vec![2, 1]));
        assert_ne!(c.hash_value(&vec![1, 2]), c.hash_value(&vec![2, 1]));
    }

    #[test]
    fn unordered_equality_ignores_order() {
        let c: SequenceConverter<HashSet<i32>, i32> =
            SequenceConverter::new(Arc::new(NumberConverter::<i32>::new()));
        let a: HashSet<i32> = [1, 2, 3].into_iter().collect();
        let b: HashSet<i32> = [3, 2, 1].into_iter().collect();
        assert!(c.equal(&a, &b));
        assert_eq!(c.hash_value(&a), c.hash_value(&b));
    }

    #[test]
    fn display_stops_at_the_limit() {
        let c = ints();
        assert_eq!(c.display(&vec![1, 2, 3], 2), "[1, 2, ...]");
        assert_eq!(c.display(&vec![], 2), "[]");
    }

    #[test]
    fn type_name_names_the_element() {
        assert_eq!(ints().type_name(), "Vec<i32>");
    }
}
