use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use mixkit_core::{Error, Record, Result, Scheme, SchemeCatalog, TypeKey, Value};
use mixkit_generate::{GeneratorRegistry, LocaleKey, default_registry};

use crate::backend::{BackendAdapter, Lookup, MemoryBackend, Producer};
use crate::cache::{TypeMixerCache, TypeMixerKey};
use crate::config::{LogLevel, MixerParams, ParamsPatch};
use crate::mix::Mix;
use crate::overrides::{Override, Overrides};
use crate::sequence::Sequence;
use crate::service::{Filters, ServiceValue};
use crate::type_mixer::{BlendContext, Middleware, MiddlewareId, TypeMixer};

static NEXT_MIXER_ID: AtomicU64 = AtomicU64::new(1);

/// Types that can be blended directly and deserialized from the record.
pub trait Blendable: DeserializeOwned {
    fn scheme() -> Scheme;
}

/// Entry point: resolves schemes through a backend and blends records.
pub struct Mixer {
    id: u64,
    backend: Arc<dyn BackendAdapter>,
    registry: Arc<GeneratorRegistry>,
    params: RwLock<MixerParams>,
    counter: AtomicU64,
    cache: &'static TypeMixerCache,
}

impl Mixer {
    pub fn new(backend: Arc<dyn BackendAdapter>) -> Self {
        Self::with_params(backend, MixerParams::default())
    }

    pub fn with_params(backend: Arc<dyn BackendAdapter>, params: MixerParams) -> Self {
        Self {
            id: NEXT_MIXER_ID.fetch_add(1, Ordering::Relaxed),
            backend,
            registry: default_registry(),
            params: RwLock::new(params),
            counter: AtomicU64::new(0),
            cache: TypeMixerCache::global(),
        }
    }

    /// Mixer over an in-memory store seeded with `catalog`.
    pub fn from_catalog(catalog: SchemeCatalog) -> Self {
        Self::new(Arc::new(MemoryBackend::new(catalog)))
    }

    /// Uses `registry` instead of the shared default registry.
    pub fn with_registry(mut self, registry: Arc<GeneratorRegistry>) -> Self {
        self.cache.remove_mixer(self.id);
        self.registry = registry;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn backend(&self) -> &Arc<dyn BackendAdapter> {
        &self.backend
    }

    pub fn registry(&self) -> &Arc<GeneratorRegistry> {
        &self.registry
    }

    /// Snapshot of the active parameters.
    pub fn params(&self) -> MixerParams {
        self.params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cached TypeMixer for `scheme` in the given mode.
    pub fn type_mixer(&self, scheme: &str, fake: bool) -> Result<Arc<TypeMixer>> {
        let scheme = self.backend.resolve_scheme(scheme)?;
        let key = TypeMixerKey {
            scheme: scheme.name.clone(),
            fake,
            factory: self.registry.id(),
            mixer: self.id,
        };
        self.cache.get_or_create(key, || {
            Ok(TypeMixer::new(
                scheme,
                fake,
                self.backend.clone(),
                self.registry.clone(),
            ))
        })
    }

    /// Builds one record of `scheme`.
    ///
    /// Errors are wrapped with the scheme name. In silence mode failures are
    /// logged and `Ok(None)` is returned instead.
    pub fn blend(&self, scheme: &str, overrides: &Overrides) -> Result<Option<Record>> {
        let params = self.params();
        match self.blend_with(scheme, overrides, &params) {
            Ok(record) => Ok(Some(record)),
            Err(err) if params.silence => {
                if params.log_level.allows(LogLevel::Warn) {
                    warn!(scheme, error = %err, "blend failed (silenced)");
                }
                Ok(None)
            }
            Err(err) => Err(err.in_scheme(scheme)),
        }
    }

    /// Blends `T::scheme()`, registering it with the backend on first use,
    /// and deserializes the record into `T`.
    pub fn blend_as<T: Blendable>(&self, overrides: &Overrides) -> Result<Option<T>> {
        let scheme = T::scheme();
        let name = scheme.name.clone();
        if self.backend.resolve_scheme(&name).is_err() {
            self.backend
                .register_scheme(scheme)
                .map_err(|err| err.in_scheme(&name))?;
        }
        match self.blend(&name, overrides)? {
            Some(record) => record
                .into_typed()
                .map(Some)
                .map_err(|err| err.in_scheme(&name)),
            None => Ok(None),
        }
    }

    /// Repeats the next blend `count` times.
    pub fn cycle(&self, count: usize) -> Cycle<'_> {
        Cycle {
            mixer: self,
            count,
            guard: None,
        }
    }

    /// Blends only when no stored record matches `filters`.
    pub fn guard(&self, filters: Filters) -> Guarded<'_> {
        Guarded {
            mixer: self,
            filters,
        }
    }

    /// Replaces generation of `field` with `value`.
    ///
    /// Accepts literals, callables, sequences and `RandomFrom`. Unknown
    /// field names are ignored. In fake mode the producer is registered for
    /// random generation as well.
    pub fn register(&self, scheme: &str, field: &str, value: impl Into<Override>) -> Result<()> {
        let producer = producer_from(field, value.into()).map_err(|err| err.in_scheme(scheme))?;
        let fake = self.params().fake;
        let type_mixer = self
            .type_mixer(scheme, fake)
            .map_err(|err| err.in_scheme(scheme))?;
        if !type_mixer.register(field, fake, producer.clone()) {
            warn!(scheme, field, "ignoring registration for an unknown field");
            return Ok(());
        }
        if fake {
            type_mixer.register(field, false, producer);
        }
        Ok(())
    }

    /// Adds a hook that runs on every blended `scheme` target, in both
    /// fake and random mode.
    pub fn middleware<F>(&self, scheme: &str, middleware: F) -> Result<MiddlewareId>
    where
        F: Fn(Record) -> Result<Record> + Send + Sync + 'static,
    {
        let middleware: Middleware = Arc::new(middleware);
        let id = MiddlewareId::next();
        for fake in [true, false] {
            self.type_mixer(scheme, fake)
                .map_err(|err| err.in_scheme(scheme))?
                .add_middleware(id, middleware.clone());
        }
        Ok(id)
    }

    /// Returns `true` when the middleware was registered for `scheme`.
    pub fn unregister_middleware(&self, scheme: &str, id: MiddlewareId) -> Result<bool> {
        let mut removed = false;
        for fake in [true, false] {
            removed |= self
                .type_mixer(scheme, fake)
                .map_err(|err| err.in_scheme(scheme))?
                .remove_middleware(id);
        }
        Ok(removed)
    }

    /// Re-reads `target` from storage.
    pub fn reload(&self, target: &Record) -> Result<Record> {
        self.backend
            .reload(target)
            .map_err(|err| err.in_scheme(target.scheme()))
    }

    pub fn reload_all(&self, targets: &[Record]) -> Result<Vec<Record>> {
        targets.iter().map(|target| self.reload(target)).collect()
    }

    /// Persists `target` through the backend.
    pub fn commit(&self, target: &Record) -> Result<()> {
        self.backend
            .commit(target)
            .map_err(|err| err.in_scheme(target.scheme()))
    }

    /// Sequence formatting its counter into `template` (`"item{0}"`).
    pub fn sequence(template: impl Into<String>) -> Sequence {
        Sequence::format(template)
    }

    /// Applies `patch` until the returned guard is dropped.
    pub fn ctx(&self, patch: ParamsPatch) -> Result<CtxGuard<'_>> {
        if let Some(locale) = patch.locale.as_deref() {
            LocaleKey::resolve(locale)?;
        }
        let mut params = self.params.write().unwrap_or_else(PoisonError::into_inner);
        let previous = params.clone();
        params.apply(&patch);
        Ok(CtxGuard {
            mixer: self,
            previous: Some(previous),
        })
    }

    /// Runs `func` with `patch` applied, restoring the previous parameters
    /// afterwards (also on error or panic).
    pub fn with_ctx<T, F>(&self, patch: ParamsPatch, func: F) -> Result<T>
    where
        F: FnOnce(&Mixer) -> Result<T>,
    {
        let _guard = self.ctx(patch)?;
        func(self)
    }

    pub fn fake() -> ServiceValue {
        ServiceValue::Fake(None)
    }

    pub fn fake_as(type_key: impl Into<TypeKey>) -> ServiceValue {
        ServiceValue::Fake(Some(type_key.into()))
    }

    pub fn random() -> ServiceValue {
        ServiceValue::Random(None)
    }

    pub fn random_as(type_key: impl Into<TypeKey>) -> ServiceValue {
        ServiceValue::Random(Some(type_key.into()))
    }

    pub fn random_from<I, V>(values: I) -> ServiceValue
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        ServiceValue::RandomFrom(values.into_iter().map(Into::into).collect())
    }

    pub fn select(filters: Filters) -> ServiceValue {
        ServiceValue::Select(filters)
    }

    pub fn mix(path: &str) -> Mix {
        Mix::new(path)
    }

    pub fn skip() -> ServiceValue {
        ServiceValue::Skip
    }

    fn blend_with(
        &self,
        scheme: &str,
        overrides: &Overrides,
        params: &MixerParams,
    ) -> Result<Record> {
        let locale = LocaleKey::resolve(&params.locale)?;
        let type_mixer = self.type_mixer(scheme, params.fake)?;
        let mut rng = self.rng(&type_mixer.scheme().name, params);
        let ctx = BlendContext {
            params,
            locale,
            mixer: self.id,
            cache: self.cache,
            depth: 0,
        };
        type_mixer.blend(overrides, &ctx, &mut rng)
    }

    fn guarded(&self, scheme: &str, filters: &Filters) -> Result<Lookup<Vec<Record>>> {
        let resolved = self
            .backend
            .resolve_scheme(scheme)
            .map_err(|err| err.in_scheme(scheme))?;
        let found = self
            .backend
            .guard(&resolved, filters)
            .map_err(|err| err.in_scheme(scheme))?;
        if let Lookup::Found(records) = &found
            && self.params().log_level.allows(LogLevel::Info)
        {
            info!(scheme, matched = records.len(), "guard hit");
        }
        Ok(found)
    }

    /// Fresh RNG per top-level blend; reproducible when a seed is set.
    fn rng(&self, scheme: &str, params: &MixerParams) -> ChaCha8Rng {
        let seed = params.seed.unwrap_or_else(rand::random);
        let call = self.counter.fetch_add(1, Ordering::Relaxed);
        ChaCha8Rng::seed_from_u64(hash_seed(seed, scheme) ^ call.wrapping_mul(0x9e3779b97f4a7c15))
    }
}

impl Drop for Mixer {
    fn drop(&mut self) {
        self.cache.remove_mixer(self.id);
    }
}

impl std::fmt::Debug for Mixer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mixer")
            .field("id", &self.id)
            .field("backend", &self.backend.name())
            .field("params", &self.params())
            .finish()
    }
}

/// Result of [`Mixer::cycle`].
#[derive(Debug)]
pub struct Cycle<'m> {
    mixer: &'m Mixer,
    count: usize,
    guard: Option<Filters>,
}

impl Cycle<'_> {
    /// Returns the matching stored records instead of blending when any exist.
    ///
    /// On a miss all `count` records are blended, unlike [`Mixer::guard`],
    /// which falls back to a single blend.
    pub fn guard(mut self, filters: Filters) -> Self {
        self.guard = Some(filters);
        self
    }

    /// Blends `count` independent records; silenced failures are dropped.
    pub fn blend(&self, scheme: &str, overrides: &Overrides) -> Result<Vec<Record>> {
        if let Some(filters) = self.guard.as_ref()
            && let Lookup::Found(records) = self.mixer.guarded(scheme, filters)?
        {
            return Ok(records);
        }
        let mut records = Vec::with_capacity(self.count);
        for _ in 0..self.count {
            if let Some(record) = self.mixer.blend(scheme, overrides)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

/// Result of [`Mixer::guard`].
#[derive(Debug)]
pub struct Guarded<'m> {
    mixer: &'m Mixer,
    filters: Filters,
}

impl Guarded<'_> {
    /// First stored match, or a single fresh blend.
    pub fn blend(&self, scheme: &str, overrides: &Overrides) -> Result<Option<Record>> {
        match self.mixer.guarded(scheme, &self.filters)? {
            Lookup::Found(records) => Ok(records.into_iter().next()),
            Lookup::NotFound => self.mixer.blend(scheme, overrides),
        }
    }
}

/// Restores the mixer's previous parameters when dropped.
#[must_use = "parameters are restored as soon as the guard is dropped"]
pub struct CtxGuard<'m> {
    mixer: &'m Mixer,
    previous: Option<MixerParams>,
}

impl Drop for CtxGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self
                .mixer
                .params
                .write()
                .unwrap_or_else(PoisonError::into_inner) = previous;
        }
    }
}

fn producer_from(field: &str, value: Override) -> Result<Producer> {
    match value {
        Override::Value(value) => Ok(Producer::Constant(value)),
        Override::Call(func) => Ok(Producer::Call(func)),
        Override::Sequence(sequence) => Ok(Producer::Sequence(sequence)),
        Override::Service(ServiceValue::RandomFrom(values)) => Ok(Producer::Choice(values)),
        Override::Service(other) => Err(Error::InvalidParams(format!(
            "{field}: marker {other:?} cannot be registered"
        ))),
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
