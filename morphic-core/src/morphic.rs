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

use crate::config::Config;
use crate::converter::{Converter, Convertible, TypedConsumer, TypedProvider, Value};
use crate::entry::{ConsumerFactory, EntryOutput, ProviderFactory};
use crate::error::Error;
use crate::forms::{JsonFactory, ValueFactory, XmlFactory};
use crate::produce::Produce;
use crate::resolver::TypeRegistry;
use crate::schema::{Schema, Visibility};
use std::sync::Arc;

/// Entry point tying a [`TypeRegistry`] to production passes.
///
/// # Examples
///
/// ```rust
/// use morphic_core::morphic::Morphic;
///
/// let morphic = Morphic::default().max_depth(32);
/// let numbers: Vec<i64> = morphic.from_text("[1, 2, \"3\"]").unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// assert_eq!(morphic.to_text(&numbers).unwrap(), "[1,2,3]");
/// ```
///
/// The configuration lives in the registry, so the builder methods start a
/// fresh registry: call them before registering builders.
#[derive(Clone, Debug, Default)]
pub struct Morphic {
    registry: TypeRegistry,
}

impl Morphic {
    /// Uses `registry` and its configuration.
    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the least visible field picked up by default field selection.
    pub fn visibility_bound(self, visibility: Visibility) -> Self {
        self.reconfigure(|config| config.visibility_bound = visibility)
    }

    /// Limits container nesting; deeper input fails with
    /// [`Error::DepthExceed`].
    pub fn max_depth(self, max_depth: u32) -> Self {
        self.reconfigure(|config| config.max_depth = max_depth)
    }

    /// Number of elements [`Morphic::display`] renders per container.
    pub fn display_limit(self, display_limit: usize) -> Self {
        self.reconfigure(|config| config.display_limit = display_limit)
    }

    fn reconfigure(self, change: impl FnOnce(&mut Config)) -> Self {
        let mut config = self.registry.config().clone();
        change(&mut config);
        Morphic {
            registry: TypeRegistry::new(config),
        }
    }

    pub fn get_registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        self.registry.config()
    }

    pub fn converter<T: Convertible>(&self) -> Result<Arc<dyn Converter<T>>, Error> {
        T::resolve(&self.registry)
    }

    /// The schema of a structural type.
    pub fn schema<T: Convertible>(&self) -> Result<Arc<Schema<T>>, Error> {
        let converter = self.converter::<T>()?;
        converter.schema().ok_or_else(|| {
            Error::resolution(format!("{} is not described by a schema", converter.type_name()))
        })
    }

    /// Decodes a `T` from `input` read through `factory`.
    pub fn decode<T, I, F>(&self, input: &I, factory: &F) -> Result<T, Error>
    where
        T: Convertible,
        I: ?Sized,
        F: ProviderFactory<I>,
    {
        let consumer = TypedConsumer::new(self.converter::<T>()?);
        Produce::with_config(factory.make(input), self.config()).run(consumer)
    }

    /// Encodes `value` with a consumer from `factory`.
    pub fn encode<T, F>(
        &self,
        value: &T,
        factory: &F,
    ) -> Result<<F::Consumer as EntryOutput>::Output, Error>
    where
        T: Convertible,
        F: ConsumerFactory,
    {
        let provider = TypedProvider::new(value, self.converter::<T>()?);
        Produce::with_config(Box::new(provider), self.config()).run(factory.make())
    }

    pub fn from_text<T: Convertible>(&self, text: &str) -> Result<T, Error> {
        self.decode(text, &JsonFactory)
    }

    pub fn to_text<T: Convertible>(&self, value: &T) -> Result<String, Error> {
        self.encode(value, &JsonFactory)
    }

    pub fn from_xml<T: Convertible>(&self, text: &str) -> Result<T, Error> {
        self.decode(text, &XmlFactory)
    }

    pub fn to_xml<T: Convertible>(&self, value: &T) -> Result<String, Error> {
        self.encode(value, &XmlFactory)
    }

    pub fn from_value<T: Convertible>(&self, value: &Value) -> Result<T, Error> {
        self.decode(value, &ValueFactory)
    }

    pub fn to_value<T: Convertible>(&self, value: &T) -> Result<Value, Error> {
        self.encode(value, &ValueFactory)
    }

    /// Deep copy through the converter of `T`.
    pub fn copy<T: Convertible>(&self, value: &T) -> Result<T, Error> {
        self.converter::<T>()?.copy(value)
    }

    pub fn equal<T: Convertible>(&self, a: &T, b: &T) -> Result<bool, Error> {
        Ok(self.converter::<T>()?.equal(a, b))
    }

    pub fn hash_value<T: Convertible>(&self, value: &T) -> Result<u64, Error> {
        Ok(self.converter::<T>()?.hash_value(value))
    }

    /// Renders `value`, cutting containers at the configured display limit.
    pub fn display<T: Convertible>(&self, value: &T) -> Result<String, Error> {
        let limit = self.config().display_limit();
        Ok(self.converter::<T>()?.display(value, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn formats_share_one_registry() {
        let morphic = Morphic::default();
        let numbers: Vec<i64> = morphic.from_text("[1, \"2\", 3.0]").unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(morphic.to_xml(&numbers).unwrap(), "<i><i>1</i><i>2</i><i>3</i></i>");
        let back: Vec<i64> = morphic.from_xml("<i><i>1</i><i>2</i><i>3</i></i>").unwrap();
        assert_eq!(back, numbers);
        let tree = morphic.to_value(&numbers).unwrap();
        assert_eq!(tree.as_list().map(<[Value]>::len), Some(3));
        let again: Vec<i64> = morphic.from_value(&tree).unwrap();
        assert_eq!(again, numbers);
    }

    #[test]
    fn builder_settings_reach_the_pass() {
        let morphic = Morphic::default().max_depth(1).display_limit(2);
        assert_eq!(morphic.config().max_depth(), 1);
        let nested: Result<Vec<Vec<i64>>, Error> = morphic.from_text("[[1]]");
        assert!(matches!(nested, Err(Error::DepthExceed(_))));
        assert_eq!(morphic.display(&vec![1i64, 2, 3]).unwrap(), "[1, 2, ...]");
    }

    #[test]
    fn value_helpers() {
        let morphic = Morphic::default();
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), vec![1i32]);
        let copy = morphic.copy(&map).unwrap();
        assert!(morphic.equal(&map, &copy).unwrap());
        assert_eq!(
            morphic.hash_value(&map).unwrap(),
            morphic.hash_value(&copy).unwrap()
        );
        assert!(matches!(
            morphic.schema::<String>(),
            Err(Error::Resolution(_))
        ));
    }
}
