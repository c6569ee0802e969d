use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rand::RngCore;
use tracing::{debug, info, warn};

use mixkit_core::{Error, Record, RelationKind, Result, Scheme, TypeKey, Value};
use mixkit_generate::{GeneratorParams, GeneratorRegistry, LocaleKey};

use crate::backend::{BackendAdapter, Lookup, Producer};
use crate::cache::{TypeMixerCache, TypeMixerKey};
use crate::config::{LogLevel, MixerParams};
use crate::field::Field;
use crate::mix::Mix;
use crate::overrides::{Override, Overrides};
use crate::service::ServiceValue;

/// Regenerations allowed per unique value before giving up.
pub const UNIQUE_RETRIES: u32 = 100;

/// Deepest chain of relation blends allowed from one top-level blend.
pub const MAX_DEPTH: usize = 8;

/// Hook applied to every blended target of a scheme.
pub type Middleware = Arc<dyn Fn(Record) -> Result<Record> + Send + Sync>;

static NEXT_MIDDLEWARE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned when a middleware is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MiddlewareId(u64);

impl MiddlewareId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MIDDLEWARE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Per-call settings threaded through nested blends.
#[derive(Clone, Copy)]
pub struct BlendContext<'a> {
    pub params: &'a MixerParams,
    pub locale: LocaleKey,
    pub mixer: u64,
    pub cache: &'a TypeMixerCache,
    pub depth: usize,
}

impl BlendContext<'_> {
    fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ProducerKey {
    type_key: TypeKey,
    field: String,
    fake: bool,
    choices: bool,
    locale: LocaleKey,
}

enum Entry {
    Field(Field),
    Explicit(Field, Override),
}

enum Resolved {
    Set(Value),
    Skip,
    Deferred(Deferred),
}

enum Deferred {
    Mix(Mix),
    Relation { field: Field, fake: bool },
    Value(Value),
}

/// Builds records of one scheme in one mode (fake or random).
///
/// Holds the state that must survive across blends: the uniqueness ledger,
/// cached producers, registered producers and middleware.
pub struct TypeMixer {
    scheme: Arc<Scheme>,
    fields: Vec<Field>,
    fake: bool,
    backend: Arc<dyn BackendAdapter>,
    registry: Arc<GeneratorRegistry>,
    ledger: Mutex<HashMap<String, HashSet<String>>>,
    producers: RwLock<HashMap<ProducerKey, Producer>>,
    registered: RwLock<HashMap<(String, bool), Producer>>,
    middlewares: RwLock<Vec<(MiddlewareId, Middleware)>>,
}

impl TypeMixer {
    pub fn new(
        scheme: Arc<Scheme>,
        fake: bool,
        backend: Arc<dyn BackendAdapter>,
        registry: Arc<GeneratorRegistry>,
    ) -> Self {
        let fields = backend.enumerate_fields(&scheme);
        Self {
            scheme,
            fields,
            fake,
            backend,
            registry,
            ledger: Mutex::new(HashMap::new()),
            producers: RwLock::new(HashMap::new()),
            registered: RwLock::new(HashMap::new()),
            middlewares: RwLock::new(Vec::new()),
        }
    }

    pub fn scheme(&self) -> &Arc<Scheme> {
        &self.scheme
    }

    pub fn fake(&self) -> bool {
        self.fake
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Replaces generation of `field_name` in the given mode.
    ///
    /// Returns `false` (and registers nothing) for undeclared fields.
    pub fn register(&self, field_name: &str, fake: bool, producer: Producer) -> bool {
        if !self.has_field(field_name) {
            return false;
        }
        self.registered
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((field_name.to_string(), fake), producer);
        true
    }

    /// Appends a middleware; middleware runs in registration order.
    pub fn add_middleware(&self, id: MiddlewareId, middleware: Middleware) {
        self.middlewares
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, middleware));
    }

    pub fn remove_middleware(&self, id: MiddlewareId) -> bool {
        let mut middlewares = self
            .middlewares
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = middlewares.len();
        middlewares.retain(|(existing, _)| *existing != id);
        middlewares.len() != before
    }

    pub fn reload(&self, target: &Record) -> Result<Record> {
        self.backend.reload(target)
    }

    /// Builds one record.
    ///
    /// Fields resolve in declared order, then undeclared overrides in the
    /// order given. Mix values and deferred relations are filled in after
    /// the target is instantiated; middleware runs last, before commit.
    pub fn blend(
        &self,
        overrides: &Overrides,
        ctx: &BlendContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Record> {
        if ctx.depth > MAX_DEPTH {
            return Err(Error::InvalidRelation {
                field: self.scheme.name.clone(),
                message: format!("relation depth exceeds {MAX_DEPTH}"),
            });
        }

        let mut values = Vec::new();
        let mut deferred = Vec::new();
        for entry in self.prepare(overrides)? {
            let (name, resolved) = match entry {
                Entry::Field(field) => {
                    let resolved = self.resolve_field(&field, ctx, rng)?;
                    (field.name, resolved)
                }
                Entry::Explicit(field, value) => {
                    let resolved = self.resolve_explicit(&field, &value, ctx, rng)?;
                    (field.name, resolved)
                }
            };
            match resolved {
                Resolved::Set(value) => values.push((name, value)),
                Resolved::Skip => {}
                Resolved::Deferred(pending) => deferred.push((name, pending)),
            }
        }

        let target = self.backend.instantiate(&self.scheme, values)?;

        let mut view = target.clone();
        let mut second_pass = Vec::with_capacity(deferred.len());
        for (name, pending) in deferred {
            let value = match pending {
                Deferred::Mix(mix) => mix.resolve(&view)?,
                Deferred::Relation { field, fake } => {
                    self.blend_deferred(&field, fake, &view, ctx, rng)?
                }
                Deferred::Value(value) => value,
            };
            view.set(name.clone(), value.clone());
            second_pass.push((name, value));
        }
        let mut target = self.backend.postprocess(target, second_pass)?;

        for middleware in self.middleware_snapshot() {
            target = middleware(target)?;
        }

        if ctx.params.commit {
            self.backend.commit(&target)?;
        }

        if ctx.params.log_level.allows(LogLevel::Info) {
            info!(
                scheme = %self.scheme.name,
                fields = target.len(),
                fake = self.fake,
                depth = ctx.depth,
                "blended"
            );
        }
        Ok(target)
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    fn prepare(&self, overrides: &Overrides) -> Result<Vec<Entry>> {
        let (direct, nested) = overrides.split_nested();
        let find_direct =
            |name: &str| direct.iter().find(|(key, _)| key == name).map(|(_, value)| value);
        let find_nested =
            |name: &str| nested.iter().find(|(key, _)| key == name).map(|(_, params)| params);
        let conflict = |name: &str| Error::InvalidRelation {
            field: name.to_string(),
            message: "a value and nested params cannot be combined".to_string(),
        };

        let mut entries = Vec::with_capacity(self.fields.len() + direct.len());
        for field in &self.fields {
            match (find_direct(&field.name), find_nested(&field.name)) {
                (Some(_), Some(_)) => return Err(conflict(&field.name)),
                (Some(value), None) => entries.push(Entry::Explicit(field.clone(), value.clone())),
                (None, Some(params)) => {
                    entries.push(Entry::Field(field.clone().with_params(params.clone())))
                }
                (None, None) => entries.push(Entry::Field(field.clone())),
            }
        }

        for (key, value) in direct.iter().filter(|(key, _)| !self.has_field(key)) {
            if find_nested(key).is_some() {
                return Err(conflict(key));
            }
            entries.push(Entry::Explicit(Field::ad_hoc(key.clone()), value.clone()));
        }
        for (prefix, params) in nested.iter().filter(|(prefix, _)| !self.has_field(prefix)) {
            entries.push(Entry::Field(
                Field::ad_hoc(prefix.clone()).with_params(params.clone()),
            ));
        }
        Ok(entries)
    }

    fn resolve_field(
        &self,
        field: &Field,
        ctx: &BlendContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Resolved> {
        if field.ad_hoc {
            return nested_record(&field.name, &field.params)
                .map(|record| Resolved::Set(Value::from(record)));
        }
        if field.params.is_empty()
            && let Some(default) = self.backend.get_default(field)
        {
            return Ok(Resolved::Set(default));
        }
        if !self.backend.is_required(field) {
            return Ok(Resolved::Skip);
        }
        self.generate(field, self.fake, ctx, rng)
    }

    fn resolve_explicit(
        &self,
        field: &Field,
        value: &Override,
        ctx: &BlendContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Resolved> {
        if let Override::Service(service) = value {
            return self.resolve_service(field, service, ctx, rng);
        }
        let value = value.evaluate(&field.name)?;
        Ok(if field.is_deferred() {
            Resolved::Deferred(Deferred::Value(value))
        } else {
            Resolved::Set(value)
        })
    }

    fn resolve_service(
        &self,
        field: &Field,
        service: &ServiceValue,
        ctx: &BlendContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Resolved> {
        match service {
            ServiceValue::Skip => Ok(Resolved::Skip),
            ServiceValue::Mix(mix) => Ok(Resolved::Deferred(Deferred::Mix(mix.clone()))),
            ServiceValue::RandomFrom(values) => Producer::Choice(values.clone())
                .produce(&field.name, rng)
                .map(Resolved::Set),
            ServiceValue::Fake(type_key) => {
                self.generate(&retype(field, type_key.as_ref())?, true, ctx, rng)
            }
            ServiceValue::Random(type_key) => {
                self.generate(&retype(field, type_key.as_ref())?, false, ctx, rng)
            }
            ServiceValue::Select(filters) => match self.backend.select_existing(field, filters)? {
                Lookup::Found(candidates) if !candidates.is_empty() => {
                    Producer::Choice(candidates)
                        .produce(&field.name, rng)
                        .map(Resolved::Set)
                }
                _ => Err(Error::SelectNotFound(field.name.clone())),
            },
        }
    }

    fn generate(
        &self,
        field: &Field,
        fake: bool,
        ctx: &BlendContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Resolved> {
        if field.params.is_empty()
            && let Some(producer) = self.registered_producer(&field.name, fake)
        {
            return self.produce(field, &producer, rng).map(Resolved::Set);
        }

        if let Some(relation) = field.relation() {
            if relation.is_deferred() {
                return Ok(Resolved::Deferred(Deferred::Relation {
                    field: field.clone(),
                    fake,
                }));
            }
            let child = self.child_mixer(field, &relation.target, fake, ctx)?;
            return child
                .blend(&field.params, &ctx.nested(), rng)
                .map(|record| Resolved::Set(Value::from(record)));
        }

        let producer = self.producer(field, fake, ctx)?;
        self.produce(field, &producer, rng).map(Resolved::Set)
    }

    fn produce(&self, field: &Field, producer: &Producer, rng: &mut dyn RngCore) -> Result<Value> {
        if self.backend.is_unique(field) {
            self.unique_value(&field.name, producer, rng)
        } else {
            producer.produce(&field.name, rng)
        }
    }

    fn unique_value(
        &self,
        field_name: &str,
        producer: &Producer,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let mut value = producer.produce(field_name, rng)?;
        let mut attempts = 0;
        loop {
            let inserted = self
                .ledger
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(field_name.to_string())
                .or_default()
                .insert(value.key());
            if inserted {
                return Ok(value);
            }
            if attempts >= UNIQUE_RETRIES {
                warn!(
                    scheme = %self.scheme.name,
                    field = field_name,
                    attempts,
                    "unique values exhausted"
                );
                return Err(Error::UniquenessExhausted {
                    field: field_name.to_string(),
                    attempts,
                });
            }
            attempts += 1;
            value = producer.produce(field_name, rng)?;
        }
    }

    fn registered_producer(&self, field_name: &str, fake: bool) -> Option<Producer> {
        self.registered
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(field_name.to_string(), fake))
            .cloned()
    }

    /// Cached per field and mode unless params are given.
    fn producer(&self, field: &Field, fake: bool, ctx: &BlendContext<'_>) -> Result<Producer> {
        let extra = scalar_params(field)?;
        if !extra.is_empty() {
            return self
                .backend
                .make_generator(&self.registry, field, &field.name, fake, ctx.locale)?
                .with_params(&extra);
        }

        let key = ProducerKey {
            type_key: field.def.type_key.clone(),
            field: field.name.clone(),
            fake,
            choices: !field.def.choices.is_empty(),
            locale: ctx.locale,
        };
        if let Some(producer) = self
            .producers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(producer.clone());
        }

        let producer =
            self.backend
                .make_generator(&self.registry, field, &field.name, fake, ctx.locale)?;
        if ctx.params.log_level.allows(LogLevel::Debug) {
            debug!(
                scheme = %self.scheme.name,
                field = %field.name,
                fake,
                producer = ?producer,
                "producer cached"
            );
        }
        self.producers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, producer.clone());
        Ok(producer)
    }

    fn child_mixer(
        &self,
        field: &Field,
        target: &str,
        fake: bool,
        ctx: &BlendContext<'_>,
    ) -> Result<Arc<TypeMixer>> {
        let scheme = self
            .backend
            .resolve_scheme(target)
            .map_err(|err| Error::InvalidRelation {
                field: field.name.clone(),
                message: err.to_string(),
            })?;
        let key = TypeMixerKey {
            scheme: scheme.name.clone(),
            fake,
            factory: self.registry.id(),
            mixer: ctx.mixer,
        };
        ctx.cache.get_or_create(key, || {
            Ok(TypeMixer::new(
                scheme,
                fake,
                self.backend.clone(),
                self.registry.clone(),
            ))
        })
    }

    /// Second-pass relation: blended once the owner exists, with the
    /// owner's primary key (or the owner itself) in the back-reference.
    fn blend_deferred(
        &self,
        field: &Field,
        fake: bool,
        owner: &Record,
        ctx: &BlendContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Value> {
        let Some(relation) = field.relation() else {
            return Err(Error::InvalidRelation {
                field: field.name.clone(),
                message: "not a relation".to_string(),
            });
        };
        let child = self.child_mixer(field, &relation.target, fake, ctx)?;

        let mut params = field.params.clone();
        if let Some(back_ref) = relation.back_ref.as_ref()
            && params.get(back_ref).is_none()
        {
            let owner_ref = self
                .scheme
                .primary_key()
                .and_then(|pk| owner.get(&pk.name))
                .cloned()
                .unwrap_or_else(|| Value::from(owner.clone()));
            params.insert(back_ref.clone(), owner_ref);
        }

        let child_ctx = ctx.nested();
        match relation.kind {
            RelationKind::ToOne => child.blend(&params, &child_ctx, rng).map(Value::from),
            RelationKind::ToMany { count } => (0..count)
                .map(|_| child.blend(&params, &child_ctx, rng).map(Value::from))
                .collect::<Result<Vec<Value>>>()
                .map(Value::List),
        }
    }

    fn middleware_snapshot(&self) -> Vec<Middleware> {
        self.middlewares
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, middleware)| middleware.clone())
            .collect()
    }
}

/// Field as seen through a `Fake(type)` / `Random(type)` marker.
fn retype(field: &Field, type_key: Option<&TypeKey>) -> Result<Field> {
    match type_key {
        Some(type_key) => {
            let mut def = (*field.def).clone();
            def.type_key = type_key.clone();
            def.choices.clear();
            def.relation = None;
            Ok(Field::new(Arc::new(def)).with_params(field.params.clone()))
        }
        None if field.ad_hoc => Err(Error::InvalidParams(format!(
            "field '{}' is not declared; give the marker a type",
            field.name
        ))),
        None => Ok(field.clone()),
    }
}

/// Params on a scalar field are generator params and must be literals.
fn scalar_params(field: &Field) -> Result<GeneratorParams> {
    field
        .params
        .iter()
        .map(|(key, value)| match value.as_value() {
            Some(value) => Ok((key.to_string(), value.clone())),
            None => Err(Error::InvalidRelation {
                field: field.name.clone(),
                message: format!("param '{key}' must be a literal value"),
            }),
        })
        .collect()
}

/// Record for an undeclared `__` prefix, built straight from its params.
fn nested_record(name: &str, params: &Overrides) -> Result<Record> {
    let (direct, nested) = params.split_nested();
    let mut record = Record::new(name);
    for (key, value) in direct {
        let value = value.evaluate(&key)?;
        record.set(key, value);
    }
    for (prefix, params) in nested {
        let child = nested_record(&prefix, &params)?;
        record.set(prefix, Value::from(child));
    }
    Ok(record)
}

impl std::fmt::Debug for TypeMixer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMixer")
            .field("scheme", &self.scheme.name)
            .field("fake", &self.fake)
            .field("backend", &self.backend.name())
            .finish()
    }
}
