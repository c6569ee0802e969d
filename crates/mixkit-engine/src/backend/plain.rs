use std::sync::{Arc, PoisonError, RwLock};

use mixkit_core::{Result, Scheme, SchemeCatalog};

use super::BackendAdapter;

/// Catalog-only backend: builds records without storing them.
#[derive(Debug, Default)]
pub struct PlainBackend {
    catalog: RwLock<SchemeCatalog>,
}

impl PlainBackend {
    pub fn new(catalog: SchemeCatalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }
}

impl BackendAdapter for PlainBackend {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn resolve_scheme(&self, name: &str) -> Result<Arc<Scheme>> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(name)
    }

    fn register_scheme(&self, scheme: Scheme) -> Result<Arc<Scheme>> {
        Ok(self
            .catalog
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scheme))
    }
}
