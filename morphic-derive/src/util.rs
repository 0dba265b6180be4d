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

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Field, Fields, Generics, Index, Member, Visibility};

/// Source field with its position and schema name.
///
/// Tuple struct fields are named by their index.
pub struct SourceField<'a> {
    pub field: &'a Field,
    pub member: Member,
    pub field_name: String,
}

pub fn source_fields(fields: &Fields) -> Vec<SourceField<'_>> {
    fields
        .iter()
        .enumerate()
        .map(|(ix, field)| match &field.ident {
            Some(ident) => SourceField {
                field,
                member: Member::Named(ident.clone()),
                field_name: ident.to_string(),
            },
            None => SourceField {
                field,
                member: Member::Unnamed(Index {
                    index: ix as u32,
                    span: Span::call_site(),
                }),
                field_name: ix.to_string(),
            },
        })
        .collect()
}

/// `Self { a: .., b: .. }` or `Self(.., ..)`.
pub fn self_construction(fields: &Fields, inits: &[(Member, TokenStream)]) -> TokenStream {
    match fields {
        Fields::Named(_) => {
            let items = inits.iter().map(|(member, value)| quote! { #member: #value });
            quote! { Self { #(#items),* } }
        }
        Fields::Unnamed(_) => {
            let items = inits.iter().map(|(_, value)| value);
            quote! { Self( #(#items),* ) }
        }
        Fields::Unit => quote! { Self },
    }
}

/// Maps Rust visibility onto the schema visibility levels.
///
/// `pub(crate)` is internal to the crate, other restricted forms are
/// visible to a part of it only.
pub fn schema_visibility(vis: &Visibility) -> TokenStream {
    let level = match vis {
        Visibility::Public(_) => quote! { Public },
        Visibility::Restricted(restricted) if restricted.path.is_ident("crate") => {
            quote! { Internal }
        }
        Visibility::Restricted(restricted) if restricted.path.is_ident("self") => {
            quote! { Private }
        }
        Visibility::Restricted(_) => quote! { Protected },
        Visibility::Inherited => quote! { Private },
    };
    quote! { ::morphic_core::schema::Visibility::#level }
}

/// Adds a `Convertible` bound to every type parameter.
pub fn convertible_generics(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(syn::parse_quote!(::morphic_core::converter::Convertible));
    }
    generics
}
