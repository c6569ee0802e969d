use std::sync::Arc;

use mixkit_core::{FieldDef, RelationDef, TypeKey};

use crate::overrides::Overrides;

/// A scheme field as seen by one blend: its declaration plus any nested
/// params supplied through `__` keys.
#[derive(Debug, Clone)]
pub struct Field {
    pub def: Arc<FieldDef>,
    pub name: String,
    pub params: Overrides,
    /// Synthesised from an undeclared `__` prefix.
    pub ad_hoc: bool,
}

impl Field {
    pub fn new(def: Arc<FieldDef>) -> Self {
        Self {
            name: def.name.clone(),
            def,
            params: Overrides::new(),
            ad_hoc: false,
        }
    }

    /// Placeholder for an undeclared prefix; its value is a nested record
    /// built from the params.
    pub fn ad_hoc(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            def: Arc::new(FieldDef::new(name.clone(), TypeKey::new("record"))),
            name,
            params: Overrides::new(),
            ad_hoc: true,
        }
    }

    pub fn with_params(mut self, params: Overrides) -> Self {
        self.params = params;
        self
    }

    pub fn relation(&self) -> Option<&RelationDef> {
        self.def.relation.as_ref()
    }

    pub fn is_deferred(&self) -> bool {
        self.def.is_deferred()
    }
}
