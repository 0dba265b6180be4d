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

//! Erased access to one field of a schema owner `S`.

use crate::converter::{Converter, ErasedConverter};
use crate::entry::{Entry, EntryBuilder, Incoming};
use crate::error::Error;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Getter and setter of a field, with the field's value type erased.
pub(crate) trait FieldAccess<S>: Send + Sync {
    fn encode<'a>(
        &self,
        owner: &'a S,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error>;

    /// Decodes straight into `owner`.
    fn decode_into(&self, owner: &mut S, incoming: Incoming<'_, '_>) -> Result<(), Error>;

    fn set_boxed(&self, owner: &mut S, value: Box<dyn Any>) -> Result<(), Error>;

    fn get<'s>(&self, owner: &'s S) -> &'s dyn Any;

    fn copy_boxed(&self, owner: &S) -> Result<Box<dyn Any>, Error>;

    fn copy_into(&self, from: &S, to: &mut S) -> Result<(), Error>;

    fn equal(&self, a: &S, b: &S) -> bool;

    fn hash_value(&self, owner: &S) -> u64;

    fn display(&self, owner: &S, limit: usize) -> String;
}

pub(crate) struct Accessor<S, T: 'static> {
    pub(crate) get: fn(&S) -> &T,
    pub(crate) set: fn(&mut S, T),
    pub(crate) converter: Arc<dyn Converter<T>>,
}

impl<S, T: 'static> FieldAccess<S> for Accessor<S, T> {
    fn encode<'a>(
        &self,
        owner: &'a S,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        self.converter.to_entry((self.get)(owner), name, builder)
    }

    fn decode_into(&self, owner: &mut S, incoming: Incoming<'_, '_>) -> Result<(), Error> {
        let value = self.converter.decode(incoming)?;
        (self.set)(owner, value);
        Ok(())
    }

    fn set_boxed(&self, owner: &mut S, value: Box<dyn Any>) -> Result<(), Error> {
        let value = value.downcast::<T>().map_err(|_| {
            Error::type_mismatch(std::any::type_name::<T>(), "a value of another type")
        })?;
        (self.set)(owner, *value);
        Ok(())
    }

    fn get<'s>(&self, owner: &'s S) -> &'s dyn Any {
        (self.get)(owner)
    }

    fn copy_boxed(&self, owner: &S) -> Result<Box<dyn Any>, Error> {
        Ok(Box::new(self.converter.copy((self.get)(owner))?))
    }

    fn copy_into(&self, from: &S, to: &mut S) -> Result<(), Error> {
        let value = self.converter.copy((self.get)(from))?;
        (self.set)(to, value);
        Ok(())
    }

    fn equal(&self, a: &S, b: &S) -> bool {
        self.converter.equal((self.get)(a), (self.get)(b))
    }

    fn hash_value(&self, owner: &S) -> u64 {
        self.converter.hash_value((self.get)(owner))
    }

    fn display(&self, owner: &S, limit: usize) -> String {
        self.converter.display((self.get)(owner), limit)
    }
}

/// One selected field of a [`Schema`](super::Schema).
pub struct Field<S: 'static> {
    pub(crate) ordinal: usize,
    pub(crate) name: Cow<'static, str>,
    pub(crate) converter: ErasedConverter,
    pub(crate) access: Box<dyn FieldAccess<S>>,
}

impl<S: 'static> Field<S> {
    /// Zero-based position in the schema.
    #[inline(always)]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_nullable(&self) -> bool {
        self.converter.is_nullable()
    }

    pub fn converter(&self) -> &ErasedConverter {
        &self.converter
    }

    /// Reads the field of `owner` if its value type is `T`.
    pub fn get<'s, T: 'static>(&self, owner: &'s S) -> Option<&'s T> {
        self.access.get(owner).downcast_ref::<T>()
    }

    /// Decodes `incoming` with the field's converter and stores it in
    /// `owner`. Input the converter refuses stores its default.
    pub fn decode_into(&self, owner: &mut S, incoming: Incoming<'_, '_>) -> Result<(), Error> {
        self.access.decode_into(owner, incoming)
    }
}

impl<S: 'static> fmt::Debug for Field<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("ordinal", &self.ordinal)
            .field("name", &self.name)
            .field("type", &self.converter.type_name())
            .finish()
    }
}

/// One parameter of the chosen constructor.
#[derive(Clone, Debug)]
pub struct Param {
    pub(crate) index: usize,
    pub(crate) name: Cow<'static, str>,
    pub(crate) converter: ErasedConverter,
}

impl Param {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn converter(&self) -> &ErasedConverter {
        &self.converter
    }
}

/// Arguments of one constructor call.
///
/// Every slot holds the decoded input for that parameter, or nothing when
/// the input did not mention it; [`CtorArgs::take`] then falls back to the
/// parameter type's default, which is `None` for optional types.
pub struct CtorArgs<'c> {
    slots: Vec<Option<Box<dyn Any>>>,
    params: &'c [Param],
}

impl<'c> CtorArgs<'c> {
    pub(crate) fn new(slots: Vec<Option<Box<dyn Any>>>, params: &'c [Param]) -> Self {
        CtorArgs { slots, params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Takes the argument at `index`.
    pub fn take<T: 'static>(&mut self, index: usize) -> Result<T, Error> {
        let param = self.params.get(index).ok_or_else(|| {
            Error::configuration(format!("constructor has no parameter {}", index))
        })?;
        let value = match self.slots.get_mut(index).and_then(Option::take) {
            Some(value) => value,
            None => param.converter.default_boxed()?,
        };
        value.downcast::<T>().map(|v| *v).map_err(|_| {
            Error::type_mismatch(
                std::any::type_name::<T>(),
                param.converter.value_type_name(),
            )
        })
    }

    /// Takes the argument of the parameter called `name`.
    pub fn take_named<T: 'static>(&mut self, name: &str) -> Result<T, Error> {
        let index = self
            .params
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| {
                Error::configuration(format!("constructor has no parameter '{}'", name))
            })?;
        self.take(index)
    }
}
