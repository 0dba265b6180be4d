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

//! Bridges between typed values and production passes.

use crate::converter::Converter;
use crate::entry::{
    EnclosedEntries, Entry, EntryBuilder, EntryConsumer, EntryOutput, EntryProvider, EntryValue,
    Incoming,
};
use crate::error::Error;
use std::sync::Arc;

/// Provider of a single typed value, encoded by its converter.
pub struct TypedProvider<'a, T: 'static> {
    value: Option<&'a T>,
    converter: Arc<dyn Converter<T>>,
}

impl<'a, T: 'static> TypedProvider<'a, T> {
    pub fn new(value: &'a T, converter: Arc<dyn Converter<T>>) -> Self {
        TypedProvider {
            value: Some(value),
            converter,
        }
    }
}

impl<'a, T: 'static> EntryProvider<'a> for TypedProvider<'a, T> {
    fn next_entry(
        &mut self,
        builder: &mut dyn EntryBuilder<'a>,
        _want_name: bool,
    ) -> Result<Entry, Error> {
        match self.value.take() {
            Some(value) => self.converter.to_entry(value, None, builder),
            None => builder.end_container(),
        }
    }
}

/// Consumer decoding the first top-level item into a `T`.
///
/// Without any item the output is the converter's default value.
pub struct TypedConsumer<T: 'static> {
    converter: Arc<dyn Converter<T>>,
    value: Option<T>,
}

impl<T: 'static> TypedConsumer<T> {
    pub fn new(converter: Arc<dyn Converter<T>>) -> Self {
        TypedConsumer {
            converter,
            value: None,
        }
    }

    fn put(&mut self, value: T) {
        if self.value.is_none() {
            self.value = Some(value);
        }
    }
}

impl<T: 'static> EntryConsumer for TypedConsumer<T> {
    fn consume_entry(&mut self, _name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        let value = self.converter.decode(Incoming::Value(value))?;
        self.put(value);
        Ok(())
    }

    fn consume_null(&mut self, _name: Option<&str>) -> Result<(), Error> {
        let value = self.converter.decode(Incoming::Null)?;
        self.put(value);
        Ok(())
    }

    fn consume_container(
        &mut self,
        _name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<(), Error> {
        if self.value.is_some() {
            return Ok(());
        }
        let value = self.converter.decode(Incoming::Container { entries, named })?;
        self.put(value);
        Ok(())
    }
}

impl<T: 'static> EntryOutput for TypedConsumer<T> {
    type Output = T;

    fn output(self) -> Result<T, Error> {
        match self.value {
            Some(value) => Ok(value),
            None => self.converter.default_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::SequenceConverter;
    use crate::converter::NumberConverter;
    use crate::produce::produce;

    #[test]
    fn typed_copy_through_the_protocol() {
        let converter: Arc<dyn Converter<Vec<i64>>> = Arc::new(SequenceConverter::<Vec<i64>, i64>::new(
            Arc::new(NumberConverter::<i64>::new()),
        ));
        let source = vec![3, 1, 2];
        let copied = produce(
            Box::new(TypedProvider::new(&source, converter.clone())),
            TypedConsumer::new(converter),
        )
        .unwrap();
        assert_eq!(copied, source);
    }

    #[test]
    fn empty_input_yields_the_default() {
        let converter: Arc<dyn Converter<i64>> = Arc::new(NumberConverter::<i64>::new());
        let consumer = TypedConsumer::new(converter);
        assert_eq!(consumer.output().unwrap(), 0);
    }
}
