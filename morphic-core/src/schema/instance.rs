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

//! Whole-instance helpers on a built schema.

use super::{Schema, SchemaConsumer, SchemaConverter, SchemaProvider, UpdateConsumer};
use crate::converter::{Converter, SequenceConverter, TypedConsumer, TypedProvider};
use crate::entry::{ConsumerFactory, EntryOutput, ProviderFactory};
use crate::error::Error;
use crate::produce::Produce;
use std::sync::Arc;

type Output<F> = <<F as ConsumerFactory>::Consumer as EntryOutput>::Output;

impl<S: 'static> Schema<S> {
    /// Decodes one instance from `input`.
    pub fn instance_from<I, F>(self: &Arc<Self>, input: &I, factory: &F) -> Result<S, Error>
    where
        I: ?Sized,
        F: ProviderFactory<I>,
    {
        let consumer = SchemaConsumer::new(self.clone())?;
        Produce::with_config(factory.make(input), &self.config).run(consumer)
    }

    /// Encodes one instance with a consumer from `factory`.
    pub fn instance_to<F: ConsumerFactory>(
        self: &Arc<Self>,
        value: &S,
        factory: &F,
    ) -> Result<Output<F>, Error> {
        let provider = SchemaProvider::new(value, self.clone());
        Produce::with_config(Box::new(provider), &self.config).run(factory.make())
    }

    /// Encodes the listed fields only, or all of them when `fields` is
    /// `None`, with `nameless` as the naming preference of the pass.
    pub fn instance_to_with<F: ConsumerFactory>(
        self: &Arc<Self>,
        value: &S,
        factory: &F,
        fields: Option<&[&str]>,
        nameless: Option<bool>,
    ) -> Result<Output<F>, Error> {
        let provider = SchemaProvider::with_fields(value, self.clone(), fields, nameless)?;
        Produce::with_config(Box::new(provider), &self.config).run(factory.make())
    }

    /// Decodes a positional list of instances.
    pub fn instances_from<I, F>(self: &Arc<Self>, input: &I, factory: &F) -> Result<Vec<S>, Error>
    where
        I: ?Sized,
        F: ProviderFactory<I>,
    {
        let consumer = TypedConsumer::new(self.list_converter());
        Produce::with_config(factory.make(input), &self.config).run(consumer)
    }

    #[allow(clippy::ptr_arg)]
    pub fn instances_to<F: ConsumerFactory>(
        self: &Arc<Self>,
        values: &Vec<S>,
        factory: &F,
    ) -> Result<Output<F>, Error> {
        let provider = TypedProvider::new(values, self.list_converter());
        Produce::with_config(Box::new(provider), &self.config).run(factory.make())
    }

    /// Decodes `input` onto `target`. Fields the input does not mention
    /// are left as they are.
    pub fn update_from<I, F>(self: &Arc<Self>, target: &mut S, input: &I, factory: &F) -> Result<(), Error>
    where
        I: ?Sized,
        F: ProviderFactory<I>,
    {
        let consumer = UpdateConsumer::new(self.clone(), target);
        Produce::with_config(factory.make(input), &self.config).run(consumer)
    }

    fn list_converter(self: &Arc<Self>) -> Arc<dyn Converter<Vec<S>>> {
        let element: Arc<dyn Converter<S>> = Arc::new(SchemaConverter::new(self.clone()));
        Arc::new(SequenceConverter::<Vec<S>, S>::new(element))
    }
}

#[cfg(test)]
mod tests {
    use crate::converter::Converter;
    use crate::error::Error;
    use crate::forms::json::JsonFactory;
    use crate::resolver::TypeRegistry;
    use crate::schema::{ConstructorDef, CtorArgs, FieldDef, SchemaDef};
    use std::sync::Arc;

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        a: i32,
        b: i32,
    }

    fn ordinal_pair(registry: &TypeRegistry) -> Arc<dyn Converter<Pair>> {
        registry
            .schema::<Pair, _>(&[], || {
                SchemaDef::new("Pair")
                    .field(FieldDef::<Pair, i32>::new("a", |p| &p.a, |p, v| p.a = v).ordinal(1))
                    .field(FieldDef::<Pair, i32>::new("b", |p| &p.b, |p, v| p.b = v).ordinal(0))
                    .constructor(ConstructorDef::initializer(Pair::default))
            })
            .unwrap()
    }

    #[test]
    fn ordinal_zero_takes_the_first_value() {
        let registry = TypeRegistry::default();
        let schema = ordinal_pair(&registry).schema().unwrap();
        assert!(schema.nameless());
        let pair = schema.instance_from("[1,2]", &JsonFactory).unwrap();
        assert_eq!(pair, Pair { a: 2, b: 1 });
        assert_eq!(schema.instance_to(&pair, &JsonFactory).unwrap(), "[1,2]");
        let named = schema
            .instance_to_with(&pair, &JsonFactory, Some(&["a"][..]), None)
            .unwrap();
        assert_eq!(named, r#"{"a":2}"#);
    }

    #[test]
    fn update_keeps_unmentioned_fields() {
        let registry = TypeRegistry::default();
        let schema = ordinal_pair(&registry).schema().unwrap();
        let mut pair = Pair { a: 5, b: 6 };
        schema
            .update_from(&mut pair, r#"{"b": 9}"#, &JsonFactory)
            .unwrap();
        assert_eq!(pair, Pair { a: 5, b: 9 });
    }

    struct Frozen {
        id: i64,
        label: String,
        note: Option<String>,
    }

    fn frozen(args: &mut CtorArgs<'_>) -> Result<Frozen, Error> {
        Ok(Frozen {
            id: args.take(0)?,
            label: args.take(1)?,
            note: None,
        })
    }

    #[test]
    fn constructor_arguments_and_leftover_fields() {
        let registry = TypeRegistry::default();
        let converter = registry
            .schema::<Frozen, _>(&[], || {
                SchemaDef::new("Frozen")
                    .field(FieldDef::<Frozen, i64>::new("id", |f| &f.id, |f, v| f.id = v))
                    .field(FieldDef::<Frozen, String>::new("label", |f| &f.label, |f, v| {
                        f.label = v
                    }))
                    .field(FieldDef::<Frozen, Option<String>>::new("note", |f| &f.note, |f, v| {
                        f.note = v
                    }))
                    .constructor(
                        ConstructorDef::new(frozen)
                            .param::<i64>("id")
                            .param::<String>("label"),
                    )
            })
            .unwrap();
        let schema = converter.schema().unwrap();
        let value = schema
            .instance_from(r#"{"note": "n", "id": 7, "extra": [1, 2]}"#, &JsonFactory)
            .unwrap();
        assert_eq!(value.id, 7);
        assert_eq!(value.label, "");
        assert_eq!(value.note.as_deref(), Some("n"));

        let copy = converter.copy(&value).unwrap();
        assert!(converter.equal(&copy, &value));
        assert_eq!(converter.hash_value(&copy), converter.hash_value(&value));
        assert_eq!(converter.display(&value, 10), "{id=7, label=, note=n}");

        let list = schema
            .instances_to(&vec![value, copy], &JsonFactory)
            .unwrap();
        assert_eq!(
            list,
            r#"[{"id":7,"label":"","note":"n"},{"id":7,"label":"","note":"n"}]"#
        );
        let back = schema.instances_from(list.as_str(), &JsonFactory).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[1].note.as_deref(), Some("n"));
    }
}
