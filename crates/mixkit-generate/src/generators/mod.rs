use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use rand::RngCore;

use mixkit_core::{Error, Result, TypeKey, Value};

use crate::locales::LocaleKey;
use crate::params::GeneratorParams;

pub mod fakers;
pub mod primitives;

/// Field being generated, as seen by a generator.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub field_name: &'a str,
    pub type_key: &'a TypeKey,
    pub locale: LocaleKey,
}

/// Produces a value for a field from keyword parameters and an RNG.
pub trait Generator: Send + Sync {
    fn id(&self) -> &'static str;

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        params: &GeneratorParams,
        rng: &mut dyn RngCore,
    ) -> Result<Value>;
}

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Type → generator table with aliases, ancestors and name-based fake
/// overrides.
pub struct GeneratorRegistry {
    id: u64,
    generators: HashMap<TypeKey, Arc<dyn Generator>>,
    fakers: HashMap<(String, TypeKey), Arc<dyn Generator>>,
    aliases: HashMap<TypeKey, TypeKey>,
    parents: HashMap<TypeKey, TypeKey>,
    fallback: Option<Arc<dyn Generator>>,
    resolved: RwLock<HashMap<TypeKey, Option<TypeKey>>>,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl GeneratorRegistry {
    /// Registry preloaded with the built-in generators, aliases and fakers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        primitives::register(&mut registry);
        primitives::register_aliases(&mut registry);
        fakers::register(&mut registry);
        registry
    }

    /// Registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            generators: HashMap::new(),
            fakers: HashMap::new(),
            aliases: HashMap::new(),
            parents: HashMap::new(),
            fallback: None,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Process-unique identity of this registry.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Associates every key in `types` with `generator`.
    ///
    /// Within a single call the first occurrence of a key wins; a later call
    /// replaces earlier entries.
    pub fn register<I, K>(&mut self, types: I, generator: Arc<dyn Generator>)
    where
        I: IntoIterator<Item = K>,
        K: Into<TypeKey>,
    {
        let mut seen = HashSet::new();
        for key in types {
            let key = key.into();
            if seen.insert(key.clone()) {
                self.generators.insert(key, generator.clone());
            }
        }
        self.invalidate();
    }

    /// Registers a fake override for fields named `name` of simple type `type_key`.
    pub fn register_faker(
        &mut self,
        name: &str,
        type_key: impl Into<TypeKey>,
        generator: Arc<dyn Generator>,
    ) {
        self.fakers
            .insert((normalize_name(name), type_key.into()), generator);
    }

    pub fn alias(&mut self, type_key: impl Into<TypeKey>, simple: impl Into<TypeKey>) {
        self.aliases.insert(type_key.into(), simple.into());
        self.invalidate();
    }

    pub fn inherit(&mut self, type_key: impl Into<TypeKey>, parent: impl Into<TypeKey>) {
        self.parents.insert(type_key.into(), parent.into());
        self.invalidate();
    }

    pub fn register_fallback(&mut self, generator: Arc<dyn Generator>) {
        self.fallback = Some(generator);
    }

    /// Sorted, de-duplicated ids of all registered generators.
    pub fn generator_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self
            .generators
            .values()
            .chain(self.fakers.values())
            .map(|generator| generator.id())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Maps a declared type to the registered simple type it generates as.
    ///
    /// Lookup order: exact match, alias, then the ancestor chain. Alias and
    /// ancestor hits are cached under the declared type.
    pub fn simple_type(&self, type_key: &TypeKey) -> Option<TypeKey> {
        if self.generators.contains_key(type_key) {
            return Some(type_key.clone());
        }
        if let Ok(cache) = self.resolved.read()
            && let Some(hit) = cache.get(type_key)
        {
            return hit.clone();
        }

        let found = self.walk(type_key);
        if let Ok(mut cache) = self.resolved.write() {
            cache.insert(type_key.clone(), found.clone());
        }
        found
    }

    /// Resolves the generator for a field.
    ///
    /// In fake mode a name-based override for `(field_name, simple type)`
    /// wins over the type generator. Unknown types use the fallback when one
    /// is registered.
    pub fn resolve(
        &self,
        type_key: &TypeKey,
        field_name: Option<&str>,
        fake: bool,
    ) -> Result<Arc<dyn Generator>> {
        let simple = self.simple_type(type_key);

        if fake && let Some(name) = field_name {
            let lookup_type = simple.clone().unwrap_or_else(|| type_key.clone());
            if let Some(faker) = self.fakers.get(&(normalize_name(name), lookup_type)) {
                return Ok(faker.clone());
            }
        }

        if let Some(generator) = simple.and_then(|simple| self.generators.get(&simple)) {
            return Ok(generator.clone());
        }

        self.fallback.clone().ok_or_else(|| Error::Generation {
            type_key: type_key.to_string(),
            field: field_name.unwrap_or_default().to_string(),
        })
    }

    fn walk(&self, type_key: &TypeKey) -> Option<TypeKey> {
        let mut visited = HashSet::new();
        let mut current = type_key.clone();
        loop {
            if !visited.insert(current.clone()) {
                return None;
            }
            if self.generators.contains_key(&current) {
                return Some(current);
            }
            if let Some(simple) = self.aliases.get(&current) {
                current = simple.clone();
                continue;
            }
            current = self.parents.get(&current)?.clone();
        }
    }

    fn invalidate(&self) {
        if let Ok(mut cache) = self.resolved.write() {
            cache.clear();
        }
    }
}

/// Shared registry with the built-in contents.
pub fn default_registry() -> Arc<GeneratorRegistry> {
    static DEFAULT: OnceLock<Arc<GeneratorRegistry>> = OnceLock::new();
    DEFAULT
        .get_or_init(|| Arc::new(GeneratorRegistry::new()))
        .clone()
}

fn normalize_name(name: &str) -> String {
    name.trim_start_matches('_').to_ascii_lowercase()
}
