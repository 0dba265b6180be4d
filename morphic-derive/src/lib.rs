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

//! # Morphic Derive Macros
//!
//! `#[derive(Morph)]` implements `Convertible` for structs and unit-only
//! enums, so they can be decoded from and encoded to every morphic format.
//!
//! ## Structs
//!
//! The macro describes the struct with a `SchemaDef`: one field per struct
//! field, with the field's visibility, and a constructor taking every
//! plain field as a parameter. Named, tuple and unit structs are
//! supported. Type parameters must be `Convertible` themselves and become
//! part of the registry key, so `Pair<i32>` and `Pair<String>` get
//! separate schemas.
//!
//! ```rust
//! use morphic::{Morph, Morphic};
//!
//! #[derive(Morph, Debug, PartialEq)]
//! struct Point {
//!     #[morph(opt)]
//!     x: i32,
//!     #[morph(opt)]
//!     y: i32,
//! }
//!
//! let morphic = Morphic::default();
//! let point: Point = morphic.from_text("[3, 4]").unwrap();
//! assert_eq!(point, Point { x: 3, y: 4 });
//! assert_eq!(morphic.to_text(&point).unwrap(), "[3,4]");
//! ```
//!
//! Field attributes:
//!
//! - `#[morph(opt)]`, `#[morph(opt = N)]`: selects the field, at the next
//!   free ordinal or at ordinal `N`
//! - `#[morph(name = "x")]`: renames the field
//! - `#[morph(converter = "expr")]`: converts the field with the
//!   `Arc<dyn Converter<T>>` the expression evaluates to
//! - `#[morph(intercept = "Type")]`: puts `Type::default()` in front of the
//!   field's converter as a value interceptor
//! - `#[morph(skip)]`: leaves the field out; it starts from `Default`
//!
//! Fields with a converter or an interceptor are not constructor
//! parameters: they start from `Default` and are set after construction.
//!
//! Container attributes:
//!
//! - `#[morph(name = "X")]`: the type name used in messages
//! - `#[morph(nameless)]`: encodes positionally
//! - `#[morph(properties = "a, b")]`: exactly these fields, in this order
//! - `#[morph(default)]`: creates instances with `Default::default()` and
//!   sets the decoded fields on them
//!
//! ## Enums
//!
//! Unit-only enums encode as the variant name and decode from the name or
//! the ordinal. `#[morph(name = "x")]` on a variant renames it. The first
//! variant is the default value.
//!
//! ```rust
//! use morphic::{Morph, Morphic};
//!
//! #[derive(Morph, Debug, PartialEq)]
//! enum Level {
//!     Low,
//!     #[morph(name = "hi")]
//!     High,
//! }
//!
//! let morphic = Morphic::default();
//! assert_eq!(morphic.from_text::<Level>("hi").unwrap(), Level::High);
//! assert_eq!(morphic.from_text::<Level>("0").unwrap(), Level::Low);
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;
mod util;

/// Derive macro implementing `Convertible` through a schema description.
///
/// # Example
///
/// ```rust
/// use morphic::Morph;
///
/// #[derive(Morph, Debug, PartialEq)]
/// struct Person {
///     pub name: String,
///     age: i32,
///     #[morph(skip)]
///     cache: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Morph, attributes(morph))]
pub fn proc_macro_derive_morph(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_morph(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
