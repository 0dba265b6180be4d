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

use crate::object::field_meta::parse_variant_meta;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, DeriveInput, Fields};

/// `impl Convertible` for a unit-only enum, converted by name or ordinal.
pub fn derive_enum(ast: &DeriveInput, data: &DataEnum, type_name: &str) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "Morph enums cannot be generic",
        ));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(name, "Morph enums need a variant"));
    }
    let mut idents = Vec::new();
    let mut names = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Morph enums support unit variants only",
            ));
        }
        let meta = parse_variant_meta(&variant.attrs)?;
        names.push(meta.name.unwrap_or_else(|| variant.ident.to_string()));
        idents.push(&variant.ident);
    }
    let ordinals: Vec<usize> = (0..idents.len()).collect();

    Ok(quote! {
        impl ::morphic_core::converter::Convertible for #name {
            fn resolve(
                registry: &::morphic_core::resolver::TypeRegistry,
            ) -> ::std::result::Result<
                ::std::sync::Arc<dyn ::morphic_core::converter::Converter<Self>>,
                ::morphic_core::error::Error,
            > {
                registry.leaf(|| {
                    ::morphic_core::converter::EnumConverter::<Self>::new(
                        #type_name,
                        &[#(#names),*],
                        |value| match value {
                            #( Self::#idents => #ordinals, )*
                        },
                        |ordinal| match ordinal {
                            #( #ordinals => ::std::option::Option::Some(Self::#idents), )*
                            _ => ::std::option::Option::None,
                        },
                    )
                })
            }
        }
    })
}
