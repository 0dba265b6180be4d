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

//! # Morphic Core
//!
//! The engine behind morphic: objects and text formats meet through a
//! stream of named or positional entries, so every converter works with
//! every format.
//!
//! ## Architecture
//!
//! - **`entry`**: The entry protocol (providers, consumers, factories)
//! - **`produce`**: The orchestrator running one provider against one consumer
//! - **`converter`**: Per-type conversion, coercion, copy, equality and hashing
//! - **`resolver`**: The type registry caching one converter per type key
//! - **`schema`**: Field and constructor descriptors of structural types
//! - **`forms`**: JSON, XML and [`Value`](converter::Value) adapters
//! - **`morphic`**: The [`Morphic`] entry point tying these together
//! - **`config`**, **`error`**: Settings and the error type
//!
//! ## Key Concepts
//!
//! ### Entries
//!
//! A provider emits one entry per call: a scalar, a null, the start of a
//! container or the end of the current one. Containers are *named* (objects)
//! or *positional* (lists). The consumer receiving a container decides who
//! reads its members, possibly through a nested consumer of its own.
//!
//! ### Lenient decoding
//!
//! Converters coerce between scalar kinds (`"12"` reads as `12`, `1` reads
//! as `true`). Input that cannot be coerced decodes to the converter's
//! default value and is logged at `warn` level instead of failing the pass.
//!
//! ### Schemas
//!
//! Structural types are described by a [`SchemaDef`](schema::SchemaDef):
//! fields with optional ordinals, visibility and interceptors, plus an
//! optional constructor. A schema with dense ordinals accepts positional
//! input; named input is always accepted.
//!
//! ## Usage
//!
//! This crate is typically used through the `morphic` crate, which adds the
//! `Morph` derive macro.
//!
//! ```rust
//! use morphic_core::converter::Value;
//! use morphic_core::Morphic;
//!
//! let morphic = Morphic::default();
//! let tree: Value = morphic.from_text("{name: box, sizes: [1, 2]}").unwrap();
//! assert_eq!(tree.get("name").and_then(Value::as_str), Some("box"));
//! assert_eq!(morphic.to_xml(&tree).unwrap(), "<i><name>box</name><sizes><i>1</i><i>2</i></sizes></i>");
//! ```

pub mod config;
pub mod converter;
pub mod entry;
pub mod error;
pub mod forms;
pub mod morphic;
pub mod produce;
pub mod resolver;
pub mod schema;

pub use crate::config::Config;
pub use crate::converter::{Converter, Convertible, Value};
pub use crate::entry::{ConsumerFactory, EntryConsumer, EntryProvider, ProviderFactory};
pub use crate::error::Error;
pub use crate::morphic::Morphic;
pub use crate::produce::{produce, Produce};
pub use crate::resolver::TypeRegistry;
pub use crate::schema::{ConstructorDef, FieldDef, Schema, SchemaDef, Visibility};
