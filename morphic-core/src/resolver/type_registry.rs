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

use super::deferred::DeferredConverter;
use crate::config::Config;
use crate::converter::{expect_typed, Converter, ConverterId, Convertible, ErasedConverter};
use crate::error::Error;
use log::{debug, trace};
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Nominal identity of a type shape.
///
/// Equality and hashing use the [`TypeId`] only; the name is for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct Shape {
    id: TypeId,
    name: &'static str,
}

impl Shape {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Shape {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Shape identified by the marker type `M` and shown as `name`.
    ///
    /// Generic containers use a marker such as `Vec<()>` so that every
    /// instantiation shares one shape and differs only by its arguments.
    pub fn named<M: ?Sized + 'static>(name: &'static str) -> Self {
        Shape {
            id: TypeId::of::<M>(),
            name,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Cache key: a shape plus the identities of its argument converters, in
/// order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    shape: Shape,
    args: Vec<ConverterId>,
}

impl TypeKey {
    pub fn new(shape: Shape, args: &[ErasedConverter]) -> Self {
        TypeKey {
            shape,
            args: args.iter().map(ErasedConverter::id).collect(),
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn args(&self) -> &[ConverterId] {
        &self.args
    }
}

type BuilderFn =
    Arc<dyn Fn(&TypeRegistry, &[ErasedConverter]) -> Result<ErasedConverter, Error> + Send + Sync>;

type BuilderKey = (Shape, Option<Vec<ConverterId>>);

pub(crate) struct RegistryInner {
    config: Config,
    cache: RwLock<HashMap<TypeKey, ErasedConverter>>,
    builders: RwLock<HashMap<BuilderKey, BuilderFn>>,
}

impl RegistryInner {
    pub(crate) fn lookup(&self, key: &TypeKey) -> Option<ErasedConverter> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

thread_local! {
    /// Keys under construction on this thread, tagged with their registry.
    static BUILDING: RefCell<HashSet<(usize, TypeKey)>> = RefCell::new(HashSet::new());
}

/// Marks a key as being built on the current thread until dropped.
struct BuildGuard {
    slot: (usize, TypeKey),
}

impl BuildGuard {
    /// `None` when the key is already being built further up the stack.
    fn enter(registry: usize, key: &TypeKey) -> Option<BuildGuard> {
        let slot = (registry, key.clone());
        let fresh = BUILDING.with(|building| building.borrow_mut().insert(slot.clone()));
        fresh.then_some(BuildGuard { slot })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        let _ = BUILDING.try_with(|building| building.borrow_mut().remove(&self.slot));
    }
}

/// Memoizing resolver from type shapes to converters.
///
/// For any key at most one converter is ever handed out: builds run outside
/// the lock and the first successful one is installed, later racers get
/// the installed instance. Failed builds are not cached.
///
/// Cloning a registry is cheap and yields a handle to the same cache.
#[derive(Clone)]
pub struct TypeRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::new(Config::default())
    }
}

impl TypeRegistry {
    pub fn new(config: Config) -> Self {
        TypeRegistry {
            inner: Arc::new(RegistryInner {
                config,
                cache: RwLock::new(HashMap::new()),
                builders: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The process-wide registry with the default configuration.
    pub fn global() -> &'static TypeRegistry {
        static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TypeRegistry::default)
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Resolves the converter of `T`.
    pub fn resolve<T: Convertible>(&self) -> Result<Arc<dyn Converter<T>>, Error> {
        T::resolve(self)
    }

    /// Cached converter for a leaf type with no arguments.
    pub fn leaf<T: 'static, C: Converter<T>>(
        &self,
        make: impl FnOnce() -> C,
    ) -> Result<Arc<dyn Converter<T>>, Error> {
        self.get_or_build(Shape::of::<T>(), &[], |_| {
            Ok(Arc::new(make()) as Arc<dyn Converter<T>>)
        })
    }

    /// Returns the converter cached for `(shape, args)`, building it on a
    /// miss with the registered builder or else with `fallback`.
    ///
    /// A shape that reaches itself while it is being built gets a deferred
    /// converter that binds to the cached instance on first use.
    pub fn get_or_build<T, F>(
        &self,
        shape: Shape,
        args: &[ErasedConverter],
        fallback: F,
    ) -> Result<Arc<dyn Converter<T>>, Error>
    where
        T: 'static,
        F: FnOnce(&TypeRegistry) -> Result<Arc<dyn Converter<T>>, Error>,
    {
        let key = TypeKey::new(shape, args);
        if let Some(found) = self.inner.lookup(&key) {
            return expect_typed::<T>(&found);
        }
        let Some(_guard) = BuildGuard::enter(self.address(), &key) else {
            trace!("{} reached while building itself; deferring", shape.name());
            return Ok(Arc::new(DeferredConverter::<T>::new(
                Arc::downgrade(&self.inner),
                key,
            )));
        };
        debug!("cache miss for {}; building", shape.name());
        let built = match self.builder_for(&key) {
            Some(builder) => builder(self, args)?,
            None => ErasedConverter::new(fallback(self)?),
        };
        expect_typed::<T>(&built)?;
        let installed = self.install(key, built);
        expect_typed::<T>(&installed)
    }

    /// Registers a lazy builder for `shape`.
    ///
    /// With `args` set the builder only serves that argument list; without
    /// it the builder serves every argument list of the shape that has no
    /// exact builder. Converters already cached for the affected keys are
    /// evicted so the builder takes effect.
    pub fn register<T, F>(&self, shape: Shape, args: Option<&[ErasedConverter]>, builder: F)
    where
        T: 'static,
        F: Fn(&TypeRegistry, &[ErasedConverter]) -> Result<Arc<dyn Converter<T>>, Error>
            + Send
            + Sync
            + 'static,
    {
        let ids: Option<Vec<ConverterId>> =
            args.map(|args| args.iter().map(ErasedConverter::id).collect());
        let erased: BuilderFn =
            Arc::new(move |registry, args| builder(registry, args).map(ErasedConverter::new));
        self.inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| {
                key.shape != shape || ids.as_ref().is_some_and(|ids| *ids != key.args)
            });
        debug!("builder registered for {}", shape.name());
        self.inner
            .builders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((shape, ids), erased);
    }

    /// Evicts every cache entry holding `converter`. Returns whether any
    /// entry was removed.
    pub fn remove<T: 'static>(&self, converter: &Arc<dyn Converter<T>>) -> bool {
        let id = ConverterId::of(converter);
        let mut cache = self
            .inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = cache.len();
        cache.retain(|_, cached| cached.id() != id);
        let removed = before != cache.len();
        if removed {
            debug!("evicted {}", converter.type_name());
        }
        removed
    }

    /// Drops every cached converter, and every registered builder too when
    /// `also_builders` is set.
    pub fn clear(&self, also_builders: bool) {
        self.inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        if also_builders {
            self.inner
                .builders
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
        debug!("registry cleared (builders: {})", also_builders);
    }

    pub fn contains(&self, shape: Shape, args: &[ErasedConverter]) -> bool {
        self.inner.lookup(&TypeKey::new(shape, args)).is_some()
    }

    /// Number of cached converters.
    pub fn len(&self) -> usize {
        self.inner
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    fn builder_for(&self, key: &TypeKey) -> Option<BuilderFn> {
        let builders = self
            .inner
            .builders
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        builders
            .get(&(key.shape, Some(key.args.clone())))
            .or_else(|| builders.get(&(key.shape, None)))
            .cloned()
    }

    fn install(&self, key: TypeKey, built: ErasedConverter) -> ErasedConverter {
        let mut cache = self
            .inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let name = key.shape.name();
        let installed = cache.entry(key).or_insert(built).clone();
        debug!("built {} as {}", name, installed.type_name());
        installed
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("config", &self.inner.config)
            .field("cached", &self.len())
            .finish()
    }
}
