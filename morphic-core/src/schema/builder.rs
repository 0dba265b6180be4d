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

//! Schema definitions and the rules that turn them into a [`Schema`].
//!
//! A definition lists every field a type has, with its visibility and
//! markers, and every way to construct the type. [`SchemaDef::build`]
//! picks the fields, their order and naming mode, resolves their
//! converters, and chooses a constructor:
//!
//! 1. With an explicit property list, exactly those fields are taken in
//!    list order. An empty list takes every field regardless of visibility.
//! 2. Otherwise, if any field is marked, only marked fields are taken,
//!    ordered by ordinal, and the schema is positional. Ordinals that are
//!    not distinct and dense from zero fall back to named mode in
//!    declaration order, with a warning.
//! 3. Otherwise every field at or above the configured visibility bound is
//!    taken in declaration order, named.
//!
//! A constructor marked as selected always wins. Otherwise the one with
//! the most parameters matching a selected field by name and type wins,
//! ties going to fewer parameters; when nothing matches, the one with the
//! fewest parameters is used.

use super::field::{Accessor, CtorArgs, Field, FieldAccess, Param};
use super::{Constructor, Schema, Visibility};
use crate::converter::{Converter, Convertible, ErasedConverter, InterceptedConverter, ValueInterceptor};
use crate::error::Error;
use crate::resolver::TypeRegistry;
use log::{debug, warn};
use std::any::TypeId;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

type ResolveFn<T> = fn(&TypeRegistry) -> Result<Arc<dyn Converter<T>>, Error>;

enum Source<T: 'static> {
    Registry(ResolveFn<T>),
    Given(ErasedConverter),
}

/// Declaration of one field of `S` with value type `T`.
pub struct FieldDef<S: 'static, T: 'static> {
    name: Cow<'static, str>,
    visibility: Visibility,
    opt: Option<Option<usize>>,
    get: fn(&S) -> &T,
    set: fn(&mut S, T),
    source: Source<T>,
    interceptor: Option<Box<dyn ValueInterceptor<T>>>,
}

impl<S: 'static, T: Convertible> FieldDef<S, T> {
    /// A private field whose converter is resolved from the registry.
    pub fn new(name: impl Into<Cow<'static, str>>, get: fn(&S) -> &T, set: fn(&mut S, T)) -> Self {
        Self::with_source(name, get, set, Source::Registry(T::resolve))
    }
}

impl<S: 'static, T: 'static> FieldDef<S, T> {
    /// A field converted by `converter` rather than by a registry lookup.
    pub fn with_converter(
        name: impl Into<Cow<'static, str>>,
        get: fn(&S) -> &T,
        set: fn(&mut S, T),
        converter: Arc<dyn Converter<T>>,
    ) -> Self {
        let source = Source::Given(ErasedConverter::new(converter));
        Self::with_source(name, get, set, source)
    }

    fn with_source(
        name: impl Into<Cow<'static, str>>,
        get: fn(&S) -> &T,
        set: fn(&mut S, T),
        source: Source<T>,
    ) -> Self {
        FieldDef {
            name: name.into(),
            visibility: Visibility::Private,
            opt: None,
            get,
            set,
            source,
            interceptor: None,
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks the field as selected. Its ordinal is the next one not taken
    /// by an explicit ordinal.
    pub fn opt(mut self) -> Self {
        self.opt.get_or_insert(None);
        self
    }

    /// Marks the field as selected at `ordinal`.
    pub fn ordinal(mut self, ordinal: usize) -> Self {
        self.opt = Some(Some(ordinal));
        self
    }

    pub fn converter(mut self, converter: Arc<dyn Converter<T>>) -> Self {
        self.source = Source::Given(ErasedConverter::new(converter));
        self
    }

    /// Overrides the converter with one whose value type is only checked
    /// when the schema is built.
    pub fn erased_converter(mut self, converter: ErasedConverter) -> Self {
        self.source = Source::Given(converter);
        self
    }

    pub fn intercept(mut self, interceptor: impl ValueInterceptor<T>) -> Self {
        self.interceptor = Some(Box::new(interceptor));
        self
    }
}

/// [`FieldDef`] with its value type erased.
trait PendingField<S> {
    fn name(&self) -> &Cow<'static, str>;

    fn visibility(&self) -> Visibility;

    fn opt(&self) -> Option<Option<usize>>;

    fn value_type(&self) -> TypeId;

    fn bind(
        self: Box<Self>,
        registry: &TypeRegistry,
        owner: &str,
    ) -> Result<(ErasedConverter, Box<dyn FieldAccess<S>>), Error>;
}

impl<S: 'static, T: 'static> PendingField<S> for FieldDef<S, T> {
    fn name(&self) -> &Cow<'static, str> {
        &self.name
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn opt(&self) -> Option<Option<usize>> {
        self.opt
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn bind(
        self: Box<Self>,
        registry: &TypeRegistry,
        owner: &str,
    ) -> Result<(ErasedConverter, Box<dyn FieldAccess<S>>), Error> {
        let this = *self;
        let base = match this.source {
            Source::Registry(resolve) => resolve(registry).map_err(|err| {
                in_context(err, format!("field '{}' of {}", this.name, owner))
            })?,
            Source::Given(erased) => erased.typed::<T>().ok_or_else(|| {
                Error::configuration(format!(
                    "converter of field '{}' of {} converts {}, not {}",
                    this.name,
                    owner,
                    erased.value_type_name(),
                    std::any::type_name::<T>()
                ))
            })?,
        };
        let converter: Arc<dyn Converter<T>> = match this.interceptor {
            Some(interceptor) => Arc::new(InterceptedConverter::boxed(base, interceptor)),
            None => base,
        };
        let erased = ErasedConverter::new(converter.clone());
        let access = Accessor {
            get: this.get,
            set: this.set,
            converter,
        };
        Ok((erased, Box::new(access)))
    }
}

struct ParamDef {
    name: Cow<'static, str>,
    value_type: TypeId,
    resolve: fn(&TypeRegistry) -> Result<ErasedConverter, Error>,
}

fn resolve_erased<T: Convertible>(registry: &TypeRegistry) -> Result<ErasedConverter, Error> {
    Ok(ErasedConverter::new(T::resolve(registry)?))
}

/// One way to construct `S`.
pub struct ConstructorDef<S: 'static> {
    params: Vec<ParamDef>,
    selected: bool,
    build: Constructor<S>,
}

impl<S: 'static> ConstructorDef<S> {
    /// A constructor taking the parameters declared with
    /// [`ConstructorDef::param`], in declaration order.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&mut CtorArgs<'_>) -> Result<S, Error> + Send + Sync + 'static,
    {
        ConstructorDef {
            params: Vec::new(),
            selected: false,
            build: Arc::new(build),
        }
    }

    /// A constructor without parameters. Decoded fields are set on the
    /// instance it returns.
    pub fn initializer(make: fn() -> S) -> Self {
        Self::new(move |_| Ok(make()))
    }

    pub fn param<T: Convertible>(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.params.push(ParamDef {
            name: name.into(),
            value_type: TypeId::of::<T>(),
            resolve: resolve_erased::<T>,
        });
        self
    }

    /// Uses this constructor whatever the other ones look like.
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

/// Everything needed to build the [`Schema`] of `S`.
pub struct SchemaDef<S: 'static> {
    name: Cow<'static, str>,
    fields: Vec<Box<dyn PendingField<S>>>,
    constructors: Vec<ConstructorDef<S>>,
    properties: Option<Vec<Cow<'static, str>>>,
    nameless: bool,
    enclosing: bool,
}

impl<S: 'static> SchemaDef<S> {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        SchemaDef {
            name: name.into(),
            fields: Vec::new(),
            constructors: Vec::new(),
            properties: None,
            nameless: false,
            enclosing: false,
        }
    }

    pub fn field<T: 'static>(mut self, field: FieldDef<S, T>) -> Self {
        self.fields.push(Box::new(field));
        self
    }

    pub fn constructor(mut self, constructor: ConstructorDef<S>) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Selects exactly the named fields, in this order. An empty list
    /// selects every field whatever its visibility.
    pub fn properties<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Cow<'static, str>>,
    {
        self.properties = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Encodes positionally unless the field ordinals say otherwise.
    pub fn nameless(mut self, nameless: bool) -> Self {
        self.nameless = nameless;
        self
    }

    /// Declares that instances only exist inside an enclosing instance.
    /// Such a type cannot get a schema.
    pub fn enclosing(mut self, enclosing: bool) -> Self {
        self.enclosing = enclosing;
        self
    }

    pub fn build(self, registry: &TypeRegistry) -> Result<Schema<S>, Error> {
        let SchemaDef {
            name,
            fields: defs,
            constructors,
            properties,
            nameless,
            enclosing,
        } = self;
        if enclosing {
            return Err(Error::resolution(format!(
                "{} needs an enclosing instance and cannot stand alone",
                name
            )));
        }
        let (picked, nameless) = match properties {
            Some(names) if !names.is_empty() => (pick_listed(&name, &defs, &names)?, nameless),
            Some(_) => select(&name, &defs, Visibility::Private, nameless),
            None => select(&name, &defs, registry.config().visibility_bound(), nameless),
        };
        if picked.is_empty() {
            return Err(Error::resolution(format!(
                "{} has no selected fields",
                name
            )));
        }

        let mut slots: Vec<Option<Box<dyn PendingField<S>>>> = defs.into_iter().map(Some).collect();
        let mut fields = Vec::with_capacity(picked.len());
        let mut typed_names = Vec::with_capacity(picked.len());
        for ix in picked {
            let Some(def) = slots.get_mut(ix).and_then(Option::take) else {
                continue;
            };
            let field_name = def.name().clone();
            typed_names.push((field_name.clone(), def.value_type()));
            let (converter, access) = def.bind(registry, &name)?;
            fields.push(Field {
                ordinal: fields.len(),
                name: field_name,
                converter,
                access,
            });
        }

        let constructor = choose_constructor(&name, constructors, &typed_names)?;
        let mut params = Vec::with_capacity(constructor.params.len());
        for (index, def) in constructor.params.into_iter().enumerate() {
            let same_field = typed_names
                .iter()
                .position(|(n, t)| *n == def.name && *t == def.value_type);
            let converter = match same_field {
                Some(f) => fields[f].converter.clone(),
                None => (def.resolve)(registry).map_err(|err| {
                    in_context(err, format!("constructor parameter '{}' of {}", def.name, name))
                })?,
            };
            params.push(Param {
                index,
                name: def.name,
                converter,
            });
        }
        debug!(
            "schema {}: {} fields, {} constructor parameters, nameless: {}",
            name,
            fields.len(),
            params.len(),
            nameless
        );

        let by_name: HashMap<_, _> = fields
            .iter()
            .map(|f| (f.name.clone(), f.ordinal))
            .collect();
        let param_index: HashMap<_, _> = params.iter().map(|p| (p.name.clone(), p.index)).collect();
        Ok(Schema {
            name,
            fields,
            by_name,
            params,
            param_index,
            construct: constructor.build,
            nameless,
            config: registry.config().clone(),
        })
    }
}

/// Adds what was being resolved to a resolution failure.
fn in_context(err: Error, what: String) -> Error {
    match err {
        Error::Resolution(reason) => Error::resolution(format!("{}: {}", what, reason)),
        other => other,
    }
}

fn pick_listed<S>(
    owner: &str,
    defs: &[Box<dyn PendingField<S>>],
    names: &[Cow<'static, str>],
) -> Result<Vec<usize>, Error> {
    let mut picked: Vec<usize> = Vec::with_capacity(names.len());
    for name in names {
        let ix = defs.iter().position(|d| d.name() == name).ok_or_else(|| {
            Error::configuration(format!("property '{}' is not declared on {}", name, owner))
        })?;
        if !picked.contains(&ix) {
            picked.push(ix);
        }
    }
    Ok(picked)
}

/// Picks fields by markers or visibility. Returns them in schema order,
/// with the naming mode.
fn select<S>(
    owner: &str,
    defs: &[Box<dyn PendingField<S>>],
    bound: Visibility,
    nameless: bool,
) -> (Vec<usize>, bool) {
    let marked: Vec<usize> = (0..defs.len()).filter(|&ix| defs[ix].opt().is_some()).collect();
    if marked.is_empty() {
        let picked = (0..defs.len())
            .filter(|&ix| defs[ix].visibility() <= bound)
            .collect();
        return (picked, nameless);
    }
    let requested: Vec<Option<usize>> = marked.iter().map(|&ix| defs[ix].opt().flatten()).collect();
    let ordinals = assign_ordinals(&requested);
    let mut seen = vec![false; ordinals.len()];
    let dense = ordinals
        .iter()
        .all(|&o| o < seen.len() && !std::mem::replace(&mut seen[o], true));
    if !dense {
        warn!(
            "field ordinals of {} are {:?}, not distinct and dense from zero; using named mode",
            owner, ordinals
        );
        return (marked, false);
    }
    let mut ordered: Vec<(usize, usize)> = ordinals.into_iter().zip(marked).collect();
    ordered.sort_by_key(|&(ordinal, _)| ordinal);
    (ordered.into_iter().map(|(_, ix)| ix).collect(), true)
}

/// Explicit ordinals stay; the others take the lowest free ordinal in
/// declaration order.
fn assign_ordinals(requested: &[Option<usize>]) -> Vec<usize> {
    let taken: HashSet<usize> = requested.iter().flatten().copied().collect();
    let mut next = 0;
    requested
        .iter()
        .map(|ordinal| match ordinal {
            Some(ordinal) => *ordinal,
            None => {
                while taken.contains(&next) {
                    next += 1;
                }
                next += 1;
                next - 1
            }
        })
        .collect()
}

fn choose_constructor<S>(
    owner: &str,
    mut constructors: Vec<ConstructorDef<S>>,
    fields: &[(Cow<'static, str>, TypeId)],
) -> Result<ConstructorDef<S>, Error> {
    if constructors.is_empty() {
        return Err(Error::resolution(format!("{} has no constructor", owner)));
    }
    if let Some(ix) = constructors.iter().position(|c| c.selected) {
        return Ok(constructors.swap_remove(ix));
    }
    let matches = |c: &ConstructorDef<S>| {
        c.params
            .iter()
            .filter(|p| fields.iter().any(|(n, t)| *n == p.name && *t == p.value_type))
            .count()
    };
    // (index, matches, parameters)
    let mut best: Option<(usize, usize, usize)> = None;
    let mut fewest: Option<(usize, usize)> = None;
    for (ix, constructor) in constructors.iter().enumerate() {
        let count = matches(constructor);
        let size = constructor.params.len();
        if best.map_or(true, |(_, c, s)| count > c || (count == c && size < s)) {
            best = Some((ix, count, size));
        }
        if fewest.map_or(true, |(_, s)| size < s) {
            fewest = Some((ix, size));
        }
    }
    let chosen = match best {
        Some((ix, count, _)) if count > 0 => ix,
        _ => fewest.map_or(0, |(ix, _)| ix),
    };
    Ok(constructors.swap_remove(chosen))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnumbered_markers_fill_free_ordinals() {
        assert_eq!(assign_ordinals(&[Some(1), None, None]), vec![1, 0, 2]);
        assert_eq!(assign_ordinals(&[None, None]), vec![0, 1]);
    }

    #[derive(Default)]
    struct Widget {
        a: i32,
        b: String,
    }

    fn widget_def() -> SchemaDef<Widget> {
        SchemaDef::new("Widget")
            .field(FieldDef::<Widget, i32>::new("a", |p| &p.a, |p, v| p.a = v))
            .field(FieldDef::<Widget, String>::new("b", |p| &p.b, |p, v| p.b = v))
    }

    fn build(_: &mut CtorArgs<'_>) -> Result<Widget, Error> {
        Ok(Widget::default())
    }

    #[test]
    fn constructor_rules() {
        let registry = TypeRegistry::default();
        let schema = widget_def()
            .constructor(ConstructorDef::new(build).param::<i32>("a").param::<i64>("x"))
            .constructor(ConstructorDef::new(build).param::<i32>("a").param::<String>("b"))
            .constructor(ConstructorDef::initializer(Widget::default))
            .build(&registry)
            .unwrap();
        assert_eq!(schema.params().len(), 2);
        assert_eq!(schema.params()[1].name(), "b");

        // a type mismatch does not count as a match
        let schema = widget_def()
            .constructor(ConstructorDef::new(build).param::<i64>("a").param::<i64>("b"))
            .constructor(ConstructorDef::new(build).param::<i64>("z"))
            .build(&registry)
            .unwrap();
        assert_eq!(schema.params()[0].name(), "z");

        let schema = widget_def()
            .constructor(ConstructorDef::new(build).param::<i32>("a").param::<String>("b"))
            .constructor(ConstructorDef::initializer(Widget::default).selected())
            .build(&registry)
            .unwrap();
        assert!(schema.params().is_empty());

        // equal matches: fewer parameters wins, whatever the order
        let schema = widget_def()
            .constructor(ConstructorDef::new(build).param::<i32>("a").param::<i64>("x"))
            .constructor(ConstructorDef::new(build).param::<i32>("a"))
            .build(&registry)
            .unwrap();
        assert_eq!(schema.params().len(), 1);
        assert_eq!(schema.params()[0].name(), "a");
        let schema = widget_def()
            .constructor(ConstructorDef::new(build).param::<i32>("a"))
            .constructor(ConstructorDef::new(build).param::<i64>("x").param::<i32>("a"))
            .build(&registry)
            .unwrap();
        assert_eq!(schema.params().len(), 1);
    }

    #[test]
    fn ordinal_gap_falls_back_to_named() {
        let _ = env_logger::builder().is_test(true).try_init();
        let registry = TypeRegistry::default();
        let schema = SchemaDef::new("Widget")
            .field(FieldDef::<Widget, i32>::new("a", |w| &w.a, |w, v| w.a = v).ordinal(2))
            .field(FieldDef::<Widget, String>::new("b", |w| &w.b, |w, v| w.b = v).ordinal(0))
            .constructor(ConstructorDef::initializer(Widget::default))
            .build(&registry)
            .unwrap();
        assert!(!schema.nameless());
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn fatal_definitions() {
        let registry = TypeRegistry::default();
        let missing = widget_def()
            .properties(["c"])
            .constructor(ConstructorDef::initializer(Widget::default))
            .build(&registry);
        assert!(matches!(missing, Err(Error::Configuration(_))));

        let enclosed = widget_def()
            .enclosing(true)
            .constructor(ConstructorDef::initializer(Widget::default))
            .build(&registry);
        assert!(matches!(enclosed, Err(Error::Resolution(_))));

        let bare = widget_def().build(&registry);
        assert!(matches!(bare, Err(Error::Resolution(_))));

        let empty = SchemaDef::<Widget>::new("Widget")
            .constructor(ConstructorDef::initializer(Widget::default))
            .build(&registry);
        assert!(matches!(empty, Err(Error::Resolution(_))));

        let wrong = SchemaDef::new("Widget")
            .field(
                FieldDef::<Widget, i32>::new("a", |p| &p.a, |p, v| p.a = v)
                    .erased_converter(ErasedConverter::new(registry.resolve::<String>().unwrap())),
            )
            .constructor(ConstructorDef::initializer(Widget::default))
            .build(&registry);
        assert!(matches!(wrong, Err(Error::Configuration(_))));
    }
}
