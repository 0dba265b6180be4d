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

use super::{Schema, Slot};
use crate::converter::Converter;
use crate::entry::{
    EnclosedEntries, Entry, EntryBuilder, EntryConsumer, EntryOutput, EntryProvider, EntryValue,
    Incoming,
};
use crate::error::Error;
use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

/// Converter of a type described by a [`Schema`].
///
/// Instances are containers: named by default, positional when the schema
/// is nameless. A naming preference set on the pass overrides the schema.
pub struct SchemaConverter<S: 'static> {
    schema: Arc<Schema<S>>,
}

impl<S: 'static> SchemaConverter<S> {
    pub fn new(schema: Arc<Schema<S>>) -> Self {
        SchemaConverter { schema }
    }
}

impl<S: 'static> Converter<S> for SchemaConverter<S> {
    fn type_name(&self) -> Cow<'static, str> {
        self.schema.name.clone()
    }

    fn default_value(&self) -> Result<S, Error> {
        self.schema.new_instance()
    }

    fn from_entry(&self, _value: EntryValue<'_>) -> Option<S> {
        None
    }

    fn from_entries(
        &self,
        entries: &mut dyn EnclosedEntries,
        _named: bool,
    ) -> Result<Option<S>, Error> {
        let consumer = SchemaConsumer::nested(self.schema.clone())?;
        entries.intercept_output(consumer).map(Some)
    }

    fn to_entry<'a>(
        &self,
        value: &'a S,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        let named = match builder.context().nameless {
            Some(nameless) => !nameless,
            None => !self.schema.nameless,
        };
        let fields = Box::new(SchemaProvider::nested(value, self.schema.clone()));
        builder.start_container(name, named, Some(fields))
    }

    fn copy(&self, value: &S) -> Result<S, Error> {
        self.schema.copy(value)
    }

    fn equal(&self, a: &S, b: &S) -> bool {
        self.schema.equal(a, b)
    }

    fn hash_value(&self, value: &S) -> u64 {
        self.schema.hash_value(value)
    }

    fn display(&self, value: &S, limit: usize) -> String {
        self.schema.display(value, limit)
    }

    fn schema(&self) -> Option<Arc<Schema<S>>> {
        Some(self.schema.clone())
    }
}

/// Provides the fields of one instance.
///
/// A root provider opens the instance's container itself and sets the
/// pass's naming preference; a nested one only lists the fields.
pub struct SchemaProvider<'a, S: 'static> {
    value: &'a S,
    schema: Arc<Schema<S>>,
    order: Vec<usize>,
    next: usize,
    /// `(named, naming preference)` of a root container not yet opened.
    opening: Option<(bool, Option<bool>)>,
}

impl<'a, S: 'static> SchemaProvider<'a, S> {
    pub fn new(value: &'a S, schema: Arc<Schema<S>>) -> Self {
        let named = !schema.nameless;
        let mut provider = Self::nested(value, schema);
        provider.opening = Some((named, None));
        provider
    }

    /// Root provider of the listed fields only, or of all fields when
    /// `fields` is `None`. A field list always encodes named. `nameless`
    /// becomes the pass's naming preference.
    pub fn with_fields(
        value: &'a S,
        schema: Arc<Schema<S>>,
        fields: Option<&[&str]>,
        nameless: Option<bool>,
    ) -> Result<Self, Error> {
        let named = match (fields, nameless) {
            (Some(_), _) => true,
            (None, Some(nameless)) => !nameless,
            (None, None) => !schema.nameless,
        };
        let order = match fields {
            Some(names) => names
                .iter()
                .map(|name| {
                    schema.by_name.get(*name).copied().ok_or_else(|| {
                        Error::configuration(format!(
                            "{} has no field '{}'",
                            schema.name, name
                        ))
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?,
            None => (0..schema.fields.len()).collect(),
        };
        Ok(SchemaProvider {
            value,
            schema,
            order,
            next: 0,
            opening: Some((named, nameless)),
        })
    }

    pub(crate) fn nested(value: &'a S, schema: Arc<Schema<S>>) -> Self {
        let order = (0..schema.fields.len()).collect();
        SchemaProvider {
            value,
            schema,
            order,
            next: 0,
            opening: None,
        }
    }
}

impl<'a, S: 'static> EntryProvider<'a> for SchemaProvider<'a, S> {
    fn next_entry(
        &mut self,
        builder: &mut dyn EntryBuilder<'a>,
        _want_name: bool,
    ) -> Result<Entry, Error> {
        if let Some((named, preference)) = self.opening.take() {
            builder.context().nameless = preference;
            return builder.start_container(None, named, None);
        }
        let Some(&ix) = self.order.get(self.next) else {
            return builder.end_container();
        };
        self.next += 1;
        let field = &self.schema.fields[ix];
        field.access.encode(self.value, Some(field.name()), builder)
    }
}

enum State<S> {
    Instance(S),
    Buffer(Vec<Option<Box<dyn Any>>>),
}

/// Builds one instance from the entries of a container.
///
/// With an initializer the instance exists from the start and fields are
/// set as they arrive. With a constructor that takes parameters, values
/// are collected first: named entries go to the parameter of that name,
/// else to the field; unnamed entries go to the fields in order. Missing
/// parameters take their type's default.
pub struct SchemaConsumer<S: 'static> {
    schema: Arc<Schema<S>>,
    state: State<S>,
    next: usize,
    opened: bool,
}

impl<S: 'static> SchemaConsumer<S> {
    /// Consumer for a whole pass; the first container is the instance.
    pub fn new(schema: Arc<Schema<S>>) -> Result<Self, Error> {
        Self::start(schema, false)
    }

    pub(crate) fn nested(schema: Arc<Schema<S>>) -> Result<Self, Error> {
        Self::start(schema, true)
    }

    fn start(schema: Arc<Schema<S>>, opened: bool) -> Result<Self, Error> {
        let state = if schema.buffered() {
            State::Buffer(schema.empty_slots())
        } else {
            State::Instance(schema.new_instance()?)
        };
        Ok(SchemaConsumer {
            schema,
            state,
            next: 0,
            opened,
        })
    }

    fn put(&mut self, name: Option<&str>, incoming: Incoming<'_, '_>) -> Result<(), Error> {
        let schema = &self.schema;
        match &mut self.state {
            State::Instance(instance) => {
                if let Some(ix) = schema.field_for(&mut self.next, name) {
                    schema.fields[ix].access.decode_into(instance, incoming)?;
                }
            }
            State::Buffer(slots) => match schema.slot_for(&mut self.next, name) {
                Some(Slot::Param(p)) => {
                    slots[p] = Some(schema.params[p].converter.decode_boxed(incoming)?);
                }
                Some(Slot::Field(f)) => {
                    let value = schema.fields[f].converter.decode_boxed(incoming)?;
                    slots[schema.params.len() + f] = Some(value);
                }
                None => {}
            },
        }
        Ok(())
    }
}

impl<S: 'static> EntryConsumer for SchemaConsumer<S> {
    fn consume_entry(&mut self, name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        self.put(name, Incoming::Value(value))
    }

    fn consume_null(&mut self, name: Option<&str>) -> Result<(), Error> {
        self.put(name, Incoming::Null)
    }

    fn consume_container(
        &mut self,
        name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<(), Error> {
        if !self.opened {
            self.opened = true;
            return entries.consume(self);
        }
        self.put(name, Incoming::Container { entries, named })
    }
}

impl<S: 'static> EntryOutput for SchemaConsumer<S> {
    type Output = S;

    fn output(self) -> Result<S, Error> {
        match self.state {
            State::Instance(instance) => Ok(instance),
            State::Buffer(slots) => self.schema.assemble(slots),
        }
    }
}

/// Decodes entries onto an existing instance. Fields missing from the
/// input keep their values.
pub struct UpdateConsumer<'t, S: 'static> {
    schema: Arc<Schema<S>>,
    target: &'t mut S,
    next: usize,
    opened: bool,
}

impl<'t, S: 'static> UpdateConsumer<'t, S> {
    pub fn new(schema: Arc<Schema<S>>, target: &'t mut S) -> Self {
        UpdateConsumer {
            schema,
            target,
            next: 0,
            opened: false,
        }
    }

    fn put(&mut self, name: Option<&str>, incoming: Incoming<'_, '_>) -> Result<(), Error> {
        match self.schema.field_for(&mut self.next, name) {
            Some(ix) => self.schema.fields[ix].access.decode_into(self.target, incoming),
            None => Ok(()),
        }
    }
}

impl<S: 'static> EntryConsumer for UpdateConsumer<'_, S> {
    fn consume_entry(&mut self, name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        self.put(name, Incoming::Value(value))
    }

    fn consume_null(&mut self, name: Option<&str>) -> Result<(), Error> {
        self.put(name, Incoming::Null)
    }

    fn consume_container(
        &mut self,
        name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<(), Error> {
        if !self.opened {
            self.opened = true;
            return entries.consume(self);
        }
        self.put(name, Incoming::Container { entries, named })
    }
}

impl<S: 'static> EntryOutput for UpdateConsumer<'_, S> {
    type Output = ();

    fn output(self) -> Result<(), Error> {
        Ok(())
    }
}
