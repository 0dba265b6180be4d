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

//! # Morphic
//!
//! Morphic converts typed Rust values to and from text formats and untyped
//! trees without tying either side to the other. Every format is a
//! producer or a consumer of *entries*, and every type has a converter that
//! reads and writes entries, so any type works with any format.
//!
//! ## Key Features
//!
//! - **Format agnostic**: JSON-like text, XML-like text and [`Value`] trees
//!   share one protocol; new formats only implement a provider and a consumer
//! - **Lenient decoding**: numbers, strings and booleans coerce into each
//!   other, and uncoercible input falls back to the default value
//! - **Positional or named**: a schema with ordinals reads `[1, 2]` as well
//!   as `{"a": 1, "b": 2}`
//! - **Constructor aware**: immutable types are built through a constructor
//!   from buffered values
//! - **Derive macro**: `#[derive(Morph)]` describes structs and enums
//!
//! ## Objects
//!
//! ```rust
//! use morphic::{Error, Morph, Morphic};
//! use std::collections::HashMap;
//!
//! #[derive(Morph, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//!     address: Address,
//!     hobbies: Vec<String>,
//!     metadata: HashMap<String, String>,
//! }
//!
//! #[derive(Morph, Debug, PartialEq)]
//! struct Address {
//!     street: String,
//!     city: String,
//! }
//!
//! # fn main() -> Result<(), Error> {
//! let morphic = Morphic::default();
//! let person: Person = morphic.from_text(
//!     r#"{"name": "John", "age": "30", "address": {"street": "Main St", "city": "NYC"},
//!         "hobbies": ["reading"], "metadata": {"level": "senior"}}"#,
//! )?;
//! assert_eq!(person.age, 30);
//! assert_eq!(person.address.city, "NYC");
//!
//! let xml = morphic.to_xml(&person)?;
//! let back: Person = morphic.from_xml(&xml)?;
//! assert_eq!(back, person);
//! # Ok(())
//! # }
//! ```
//!
//! ## Untyped values
//!
//! ```rust
//! use morphic::{Morphic, Value};
//!
//! let morphic = Morphic::default();
//! let tree: Value = morphic.from_text("{id: 7, tags: [a, b]}").unwrap();
//! assert_eq!(tree.get("id").and_then(Value::as_i64), Some(7));
//! assert_eq!(morphic.to_text(&tree).unwrap(), r#"{"id":7,"tags":["a","b"]}"#);
//! ```
//!
//! ## Getting Started
//!
//! The derive macro expands to paths of the core crate, so add both:
//!
//! ```toml
//! [dependencies]
//! morphic = "0.1"
//! morphic-core = "0.1"
//! ```

pub use morphic_core::{
    config::Config,
    converter::{AnyObject, Converter, Convertible, EnumConverter, MappedConverter, Value},
    entry::{ConsumerFactory, EntryConsumer, EntryProvider, ProviderFactory},
    error::Error,
    forms::{JsonFactory, ValueFactory, XmlFactory},
    morphic::Morphic,
    produce::{produce, Produce},
    resolver::{Shape, TypeRegistry},
    schema::{ConstructorDef, FieldDef, Schema, SchemaDef, Visibility},
};
pub use morphic_derive::Morph;
