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

//! Parsing of `#[morph(...)]` attributes.
//!
//! Field attributes:
//! - `opt`: selects the field at the next free ordinal
//! - `opt = N`: selects the field at ordinal `N`
//! - `name = "x"`: schema name of the field
//! - `converter = "expr"`: converter override, an `Arc<dyn Converter<T>>` expression
//! - `intercept = "Type"`: value interceptor built with `Default::default()`
//! - `skip`: leaves the field out of the schema
//!
//! Container attributes:
//! - `name = "X"`: schema name of the type
//! - `nameless`: encodes positionally
//! - `properties = "a, b"`: the exact fields, in this order
//! - `default`: builds instances through `Default` and sets fields on them
//!
//! Variant attributes: `name = "x"`.

use syn::{Attribute, Expr, LitInt, LitStr, Type};

#[derive(Default)]
pub struct MorphFieldMeta {
    /// `None` when not selected, `Some(None)` for a bare `opt`.
    pub opt: Option<Option<usize>>,
    pub name: Option<String>,
    pub converter: Option<Expr>,
    pub intercept: Option<Type>,
    pub skip: bool,
}

impl MorphFieldMeta {
    /// Fields with their own conversion are set after construction
    /// instead of being constructor parameters.
    pub fn custom_conversion(&self) -> bool {
        self.converter.is_some() || self.intercept.is_some()
    }
}

#[derive(Default)]
pub struct MorphAttrs {
    pub name: Option<String>,
    pub nameless: bool,
    pub properties: Option<Vec<String>>,
    pub default: bool,
}

#[derive(Default)]
pub struct VariantMeta {
    pub name: Option<String>,
}

pub fn parse_field_meta(attrs: &[Attribute]) -> syn::Result<MorphFieldMeta> {
    let mut meta = MorphFieldMeta::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("morph")) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("opt") {
                if nested.input.is_empty() || nested.input.peek(syn::Token![,]) {
                    meta.opt = Some(None);
                } else {
                    let lit: LitInt = nested.value()?.parse()?;
                    meta.opt = Some(Some(lit.base10_parse()?));
                }
            } else if nested.path.is_ident("name") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.name = Some(lit.value());
            } else if nested.path.is_ident("converter") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.converter = Some(lit.parse()?);
            } else if nested.path.is_ident("intercept") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.intercept = Some(lit.parse()?);
            } else if nested.path.is_ident("skip") {
                meta.skip = true;
            } else {
                return Err(nested.error("unknown morph field attribute"));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

pub fn parse_morph_attrs(attrs: &[Attribute]) -> syn::Result<MorphAttrs> {
    let mut meta = MorphAttrs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("morph")) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("name") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.name = Some(lit.value());
            } else if nested.path.is_ident("nameless") {
                meta.nameless = true;
            } else if nested.path.is_ident("properties") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.properties = Some(split_names(&lit.value()));
            } else if nested.path.is_ident("default") {
                meta.default = true;
            } else {
                return Err(nested.error("unknown morph attribute"));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

pub fn parse_variant_meta(attrs: &[Attribute]) -> syn::Result<VariantMeta> {
    let mut meta = VariantMeta::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("morph")) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("name") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.name = Some(lit.value());
                Ok(())
            } else {
                Err(nested.error("unknown morph variant attribute"))
            }
        })?;
    }
    Ok(meta)
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
