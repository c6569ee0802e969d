use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use mixkit_core::Result;

use crate::type_mixer::TypeMixer;

/// Identity of a cached [`TypeMixer`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeMixerKey {
    pub scheme: String,
    pub fake: bool,
    /// Generator registry id.
    pub factory: u64,
    /// Owning mixer id.
    pub mixer: u64,
}

/// Process-wide TypeMixer cache.
///
/// TypeMixers carry the uniqueness ledger, producer cache, registered
/// producers and middleware, so every blend with the same key must reuse
/// the same instance.
#[derive(Default)]
pub struct TypeMixerCache {
    mixers: Mutex<HashMap<TypeMixerKey, Arc<TypeMixer>>>,
}

impl TypeMixerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static TypeMixerCache {
        static GLOBAL: OnceLock<TypeMixerCache> = OnceLock::new();
        GLOBAL.get_or_init(TypeMixerCache::new)
    }

    /// Returns the cached TypeMixer for `key`, building it on first use.
    pub fn get_or_create<F>(&self, key: TypeMixerKey, create: F) -> Result<Arc<TypeMixer>>
    where
        F: FnOnce() -> Result<TypeMixer>,
    {
        let mut mixers = self.mixers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mixer) = mixers.get(&key) {
            return Ok(mixer.clone());
        }
        let mixer = Arc::new(create()?);
        mixers.insert(key, mixer.clone());
        Ok(mixer)
    }

    pub fn get(&self, key: &TypeMixerKey) -> Option<Arc<TypeMixer>> {
        self.mixers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Drops every TypeMixer owned by `mixer`.
    pub fn remove_mixer(&self, mixer: u64) {
        self.mixers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| key.mixer != mixer);
    }

    pub fn reset(&self) {
        self.mixers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.mixers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
