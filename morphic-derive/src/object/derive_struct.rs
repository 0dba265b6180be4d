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

use crate::object::field_meta::{parse_field_meta, MorphAttrs, MorphFieldMeta};
use crate::util::{convertible_generics, schema_visibility, self_construction, source_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, Member};

/// `impl Convertible` resolving the schema converter of a struct.
pub fn derive_struct(
    ast: &DeriveInput,
    data: &DataStruct,
    attrs: &MorphAttrs,
) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    let type_name = attrs.name.clone().unwrap_or_else(|| name.to_string());
    let generics = convertible_generics(&ast.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = source_fields(&data.fields);
    let metas = fields
        .iter()
        .map(|f| parse_field_meta(&f.field.attrs))
        .collect::<syn::Result<Vec<_>>>()?;

    let mut field_defs = Vec::new();
    for (source, meta) in fields.iter().zip(&metas) {
        if meta.skip {
            continue;
        }
        let ty = &source.field.ty;
        let member = &source.member;
        let field_name = meta.name.clone().unwrap_or_else(|| source.field_name.clone());
        let visibility = schema_visibility(&source.field.vis);
        let def = match &meta.converter {
            Some(converter) => quote! {
                ::morphic_core::schema::FieldDef::<Self, #ty>::with_converter(
                    #field_name,
                    |s| &s.#member,
                    |s, v| s.#member = v,
                    #converter,
                )
            },
            None => quote! {
                ::morphic_core::schema::FieldDef::<Self, #ty>::new(
                    #field_name,
                    |s| &s.#member,
                    |s, v| s.#member = v,
                )
            },
        };
        let marker = match meta.opt {
            Some(Some(ordinal)) => quote! { .ordinal(#ordinal) },
            Some(None) => quote! { .opt() },
            None => quote! {},
        };
        let intercept = match &meta.intercept {
            Some(interceptor) => {
                quote! { .intercept(<#interceptor as ::std::default::Default>::default()) }
            }
            None => quote! {},
        };
        field_defs.push(quote! {
            .field(#def.visibility(#visibility) #marker #intercept)
        });
    }

    let constructor = if attrs.default {
        quote! {
            .constructor(::morphic_core::schema::ConstructorDef::initializer(
                <Self as ::std::default::Default>::default,
            ))
        }
    } else {
        gen_constructor(&data.fields, &fields, &metas)
    };

    let nameless = if attrs.nameless {
        quote! { .nameless(true) }
    } else {
        quote! {}
    };
    let properties = match &attrs.properties {
        Some(names) => {
            let count = names.len();
            quote! { .properties::<[&'static str; #count], &'static str>([#(#names),*]) }
        }
        None => quote! {},
    };

    let type_params: Vec<_> = ast.generics.type_params().map(|p| &p.ident).collect();
    let arg_count = type_params.len();

    Ok(quote! {
        impl #impl_generics ::morphic_core::converter::Convertible for #name #ty_generics #where_clause {
            fn resolve(
                registry: &::morphic_core::resolver::TypeRegistry,
            ) -> ::std::result::Result<
                ::std::sync::Arc<dyn ::morphic_core::converter::Converter<Self>>,
                ::morphic_core::error::Error,
            > {
                let args: [::morphic_core::converter::ErasedConverter; #arg_count] = [
                    #(
                        ::morphic_core::converter::ErasedConverter::new(
                            <#type_params as ::morphic_core::converter::Convertible>::resolve(registry)?,
                        )
                    ),*
                ];
                registry.schema::<Self, _>(&args, || {
                    ::morphic_core::schema::SchemaDef::new(#type_name)
                        #(#field_defs)*
                        #constructor
                        #nameless
                        #properties
                })
            }
        }
    })
}

/// A constructor taking every plain field as a parameter. Skipped fields
/// and fields with their own conversion start from `Default`.
fn gen_constructor(
    data_fields: &syn::Fields,
    fields: &[crate::util::SourceField<'_>],
    metas: &[MorphFieldMeta],
) -> TokenStream {
    let mut params = Vec::new();
    let mut inits: Vec<(Member, TokenStream)> = Vec::new();
    for (source, meta) in fields.iter().zip(metas) {
        let ty = &source.field.ty;
        if meta.skip || meta.custom_conversion() {
            inits.push((
                source.member.clone(),
                quote! { ::std::default::Default::default() },
            ));
            continue;
        }
        let index = params.len();
        let field_name = meta.name.clone().unwrap_or_else(|| source.field_name.clone());
        inits.push((source.member.clone(), quote! { args.take::<#ty>(#index)? }));
        params.push(quote! { .param::<#ty>(#field_name) });
    }
    let construction = self_construction(data_fields, &inits);
    quote! {
        .constructor(
            ::morphic_core::schema::ConstructorDef::new(
                |args: &mut ::morphic_core::schema::CtorArgs<'_>| {
                    ::std::result::Result::Ok(#construction)
                },
            )
            #(#params)*
        )
    }
}
