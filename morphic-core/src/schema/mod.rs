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

//! Structural converters for user types.
//!
//! A [`SchemaDef`] describes a type: its fields with their accessors and
//! markers, and its constructors. Building it yields a [`Schema`], which
//! [`SchemaConverter`] drives through the entry protocol. `#[derive(Morph)]`
//! writes the definition; hand-written ones work the same way.

mod builder;
mod converter;
mod field;
mod instance;

use crate::config::Config;
use crate::converter::{Converter, ErasedConverter};
use crate::error::Error;
use crate::resolver::{Shape, TypeRegistry};
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use builder::{ConstructorDef, FieldDef, SchemaDef};
pub use converter::{SchemaConsumer, SchemaConverter, SchemaProvider, UpdateConsumer};
pub use field::{CtorArgs, Field, Param};

/// How visible a field is, from most to least visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
}

pub(crate) type Constructor<S> = Arc<dyn Fn(&mut CtorArgs<'_>) -> Result<S, Error> + Send + Sync>;

/// Where a decoded entry goes.
pub(crate) enum Slot {
    Param(usize),
    Field(usize),
}

/// The built description of `S`: selected fields in order, the chosen
/// constructor and the naming mode. Immutable once built.
pub struct Schema<S: 'static> {
    pub(crate) name: Cow<'static, str>,
    pub(crate) fields: Vec<Field<S>>,
    pub(crate) by_name: HashMap<Cow<'static, str>, usize>,
    pub(crate) params: Vec<Param>,
    pub(crate) param_index: HashMap<Cow<'static, str>, usize>,
    pub(crate) construct: Constructor<S>,
    pub(crate) nameless: bool,
    pub(crate) config: Config,
}

impl<S: 'static> Schema<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field<S>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field<S>> {
        self.by_name.get(name).map(|&ix| &self.fields[ix])
    }

    /// Parameters of the chosen constructor; empty for an initializer.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Whether instances encode as positional containers by default.
    #[inline(always)]
    pub fn nameless(&self) -> bool {
        self.nameless
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decoding collects values before construction instead of setting
    /// them on a fresh instance.
    #[inline(always)]
    pub(crate) fn buffered(&self) -> bool {
        !self.params.is_empty()
    }

    /// Size of the value buffer: parameters first, then fields.
    pub(crate) fn slots(&self) -> usize {
        self.params.len() + self.fields.len()
    }

    /// Field receiving the entry called `name`, or the next field in
    /// order for unnamed entries.
    pub(crate) fn field_for(&self, next: &mut usize, name: Option<&str>) -> Option<usize> {
        match name {
            Some(name) => self.by_name.get(name).copied(),
            None => {
                let ix = *next;
                *next += 1;
                (ix < self.fields.len()).then_some(ix)
            }
        }
    }

    /// Like [`Schema::field_for`], but a constructor parameter with the
    /// same name takes precedence over the field.
    pub(crate) fn slot_for(&self, next: &mut usize, name: Option<&str>) -> Option<Slot> {
        let field = self.field_for(next, name);
        let name = match (name, field) {
            (Some(name), _) => name,
            (None, Some(ix)) => self.fields[ix].name(),
            (None, None) => return None,
        };
        match self.param_index.get(name) {
            Some(&p) => Some(Slot::Param(p)),
            None => field.map(Slot::Field),
        }
    }

    pub(crate) fn empty_slots(&self) -> Vec<Option<Box<dyn Any>>> {
        std::iter::repeat_with(|| None).take(self.slots()).collect()
    }

    /// Calls the constructor with the parameter slots, then sets every
    /// filled field slot on the new instance.
    pub(crate) fn assemble(&self, mut slots: Vec<Option<Box<dyn Any>>>) -> Result<S, Error> {
        let field_slots = slots.split_off(self.params.len().min(slots.len()));
        let mut args = CtorArgs::new(slots, &self.params);
        let mut instance = (self.construct)(&mut args)?;
        for (field, slot) in self.fields.iter().zip(field_slots) {
            if let Some(value) = slot {
                field.access.set_boxed(&mut instance, value)?;
            }
        }
        Ok(instance)
    }

    /// A new instance with every parameter at its default.
    pub fn new_instance(&self) -> Result<S, Error> {
        self.assemble(self.empty_slots())
    }

    pub fn copy(&self, value: &S) -> Result<S, Error> {
        if !self.buffered() {
            let mut copy = self.new_instance()?;
            for field in &self.fields {
                field.access.copy_into(value, &mut copy)?;
            }
            return Ok(copy);
        }
        let mut slots = self.empty_slots();
        for field in &self.fields {
            let slot = match self.param_index.get(field.name()) {
                Some(&p) => p,
                None => self.params.len() + field.ordinal,
            };
            slots[slot] = Some(field.access.copy_boxed(value)?);
        }
        self.assemble(slots)
    }

    pub fn equal(&self, a: &S, b: &S) -> bool {
        std::ptr::eq(a, b) || self.fields.iter().all(|f| f.access.equal(a, b))
    }

    pub fn hash_value(&self, value: &S) -> u64 {
        self.fields.iter().fold(1, |code, f| {
            crate::converter::combine_hash(code, f.access.hash_value(value))
        })
    }

    /// Renders `{a=1, b=2}`.
    pub fn display(&self, value: &S, limit: usize) -> String {
        let mut text = String::from("{");
        for (ix, field) in self.fields.iter().enumerate() {
            if ix > 0 {
                text.push_str(", ");
            }
            text.push_str(field.name());
            text.push('=');
            text.push_str(&field.access.display(value, limit));
        }
        text.push('}');
        text
    }
}

impl<S: 'static> fmt::Debug for Schema<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("params", &self.params)
            .field("nameless", &self.nameless)
            .finish()
    }
}

impl TypeRegistry {
    /// Resolves the schema converter of `S`, building the schema from
    /// `define` on a cache miss.
    ///
    /// `args` are the converters of the type's generic arguments; they
    /// become part of the cache key.
    pub fn schema<S, F>(
        &self,
        args: &[ErasedConverter],
        define: F,
    ) -> Result<Arc<dyn Converter<S>>, Error>
    where
        S: 'static,
        F: FnOnce() -> SchemaDef<S>,
    {
        self.get_or_build(Shape::of::<S>(), args, |registry| {
            let schema = define().build(registry)?;
            Ok(Arc::new(SchemaConverter::new(Arc::new(schema))) as Arc<dyn Converter<S>>)
        })
    }
}
