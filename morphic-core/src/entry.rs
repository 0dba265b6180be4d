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

//! The streaming entry protocol.
//!
//! A production pass moves data from an [`EntryProvider`] to an
//! [`EntryConsumer`] one entry at a time. Providers never talk to consumers
//! directly: they describe each entry through an [`EntryBuilder`], and the
//! orchestrator in [`crate::produce`] forwards scalars and drives nested
//! containers. A consumer that receives a container gets an
//! [`EnclosedEntries`] handle and decides whether to read it itself, hand it
//! to another consumer, or ignore it.

use crate::config::Config;
use crate::error::Error;
use std::fmt;

/// One scalar unit of the protocol.
///
/// Null and the container boundaries are separate builder operations, see
/// [`EntryBuilder::null_entry`], [`EntryBuilder::start_container`] and
/// [`EntryBuilder::end_container`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryValue<'v> {
    Str(&'v str),
    I64(i64),
    I32(i32),
    I16(i16),
    I8(i8),
    F64(f64),
    F32(f32),
    Bool(bool),
    Bytes(&'v [u8]),
}

impl EntryValue<'_> {
    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            EntryValue::Str(_) => "string",
            EntryValue::I64(_) => "i64",
            EntryValue::I32(_) => "i32",
            EntryValue::I16(_) => "i16",
            EntryValue::I8(_) => "i8",
            EntryValue::F64(_) => "f64",
            EntryValue::F32(_) => "f32",
            EntryValue::Bool(_) => "bool",
            EntryValue::Bytes(_) => "bytes",
        }
    }

    /// Integer view of numeric and boolean entries. Floats truncate.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            EntryValue::I64(v) => Some(v),
            EntryValue::I32(v) => Some(v as i64),
            EntryValue::I16(v) => Some(v as i64),
            EntryValue::I8(v) => Some(v as i64),
            EntryValue::F64(v) => Some(v as i64),
            EntryValue::F32(v) => Some(v as i64),
            EntryValue::Bool(v) => Some(v as i64),
            EntryValue::Str(_) | EntryValue::Bytes(_) => None,
        }
    }

    /// Floating point view of numeric and boolean entries.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            EntryValue::I64(v) => Some(v as f64),
            EntryValue::I32(v) => Some(v as f64),
            EntryValue::I16(v) => Some(v as f64),
            EntryValue::I8(v) => Some(v as f64),
            EntryValue::F64(v) => Some(v),
            EntryValue::F32(v) => Some(v as f64),
            EntryValue::Bool(v) => Some(if v { 1.0 } else { 0.0 }),
            EntryValue::Str(_) | EntryValue::Bytes(_) => None,
        }
    }
}

impl fmt::Display for EntryValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryValue::Str(v) => write!(f, "\"{}\"", v),
            EntryValue::I64(v) => write!(f, "{}", v),
            EntryValue::I32(v) => write!(f, "{}", v),
            EntryValue::I16(v) => write!(f, "{}", v),
            EntryValue::I8(v) => write!(f, "{}", v),
            EntryValue::F64(v) => write!(f, "{:?}", v),
            EntryValue::F32(v) => write!(f, "{:?}", v),
            EntryValue::Bool(v) => write!(f, "{}", v),
            EntryValue::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

/// Proof that a provider went through the builder.
///
/// Only [`EntryBuilder`] implementations inside this crate can create one, so
/// the only way for [`EntryProvider::next_entry`] to return is to emit.
#[derive(Debug)]
#[must_use]
pub struct Entry {
    _private: (),
}

impl Entry {
    pub(crate) fn new() -> Self {
        Entry { _private: () }
    }
}

/// State shared by every party of one production pass.
#[derive(Debug, Clone)]
pub struct ProduceContext {
    /// Naming preference: `None` lets each schema decide, `Some(true)` forces
    /// positional containers and `Some(false)` forces named ones.
    pub nameless: Option<bool>,
    /// Container nesting allowed in this pass. Providers that read ahead
    /// apply it to what they buffer.
    pub max_depth: u32,
}

impl Default for ProduceContext {
    fn default() -> Self {
        ProduceContext {
            nameless: None,
            max_depth: Config::default().max_depth(),
        }
    }
}

/// Builder role of the orchestrator, used by the active provider.
///
/// Each call of [`EntryProvider::next_entry`] must emit exactly one entry.
pub trait EntryBuilder<'a> {
    fn entry(&mut self, name: Option<&str>, value: EntryValue<'_>) -> Result<Entry, Error>;

    fn null_entry(&mut self, name: Option<&str>) -> Result<Entry, Error>;

    /// Opens a nested container. With `alt` set, that provider replaces the
    /// active one until the container ends.
    fn start_container(
        &mut self,
        name: Option<&str>,
        named: bool,
        alt: Option<Box<dyn EntryProvider<'a> + 'a>>,
    ) -> Result<Entry, Error>;

    fn end_container(&mut self) -> Result<Entry, Error>;

    fn context(&mut self) -> &mut ProduceContext;
}

/// Producer of entries for one input.
///
/// Once its input is exhausted a provider keeps answering with
/// [`EntryBuilder::end_container`].
pub trait EntryProvider<'a> {
    /// `want_name` tells whether the enclosing container is named.
    fn next_entry(
        &mut self,
        builder: &mut dyn EntryBuilder<'a>,
        want_name: bool,
    ) -> Result<Entry, Error>;
}

/// Sink of entries.
///
/// Names are `None` inside positional containers.
pub trait EntryConsumer {
    fn consume_entry(&mut self, name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error>;

    fn consume_null(&mut self, name: Option<&str>) -> Result<(), Error>;

    /// Called when the provider opens a container. The consumer may call
    /// [`EnclosedEntries::consume`] or [`EnclosedEntries::intercept`] once;
    /// if it does neither, the container is skipped.
    fn consume_container(
        &mut self,
        name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<(), Error>;
}

/// A consumer that aggregates what it consumed into a final value.
pub trait EntryOutput: EntryConsumer {
    type Output;

    fn output(self) -> Result<Self::Output, Error>;
}

/// Enclosed-entries role of the orchestrator, handed to a consumer for one
/// nested container.
pub trait EnclosedEntries {
    /// Reads the container with `owner`, normally the consumer that was
    /// offered the container.
    fn consume(&mut self, owner: &mut dyn EntryConsumer) -> Result<(), Error>;

    /// Reads the container with a different consumer. Changes `other` makes
    /// to the naming preference are undone when the container ends.
    fn intercept(&mut self, other: &mut dyn EntryConsumer) -> Result<(), Error>;

    fn context(&mut self) -> &mut ProduceContext;
}

impl<'e> dyn EnclosedEntries + 'e {
    /// Intercepts the container with `consumer` and returns its output.
    pub fn intercept_output<C: EntryOutput>(&mut self, mut consumer: C) -> Result<C::Output, Error> {
        self.intercept(&mut consumer)?;
        consumer.output()
    }
}

/// What a converter is asked to decode.
pub enum Incoming<'e, 'v> {
    Value(EntryValue<'v>),
    Null,
    Container {
        entries: &'e mut dyn EnclosedEntries,
        named: bool,
    },
}

impl Incoming<'_, '_> {
    pub fn describe(&self) -> String {
        match self {
            Incoming::Value(v) => format!("{} {}", v.kind(), v),
            Incoming::Null => "null".to_string(),
            Incoming::Container { named: true, .. } => "named container".to_string(),
            Incoming::Container { named: false, .. } => "positional container".to_string(),
        }
    }
}

/// Makes providers for inputs of type `I`.
pub trait ProviderFactory<I: ?Sized> {
    fn make<'a>(&self, input: &'a I) -> Box<dyn EntryProvider<'a> + 'a>;
}

/// Makes consumers for one output format.
pub trait ConsumerFactory {
    type Consumer: EntryOutput;

    fn make(&self) -> Self::Consumer;
}

/// A format usable in both directions.
pub trait ProduceFactory<I: ?Sized>: ProviderFactory<I> + ConsumerFactory {}

impl<I: ?Sized, F: ProviderFactory<I> + ConsumerFactory> ProduceFactory<I> for F {}
