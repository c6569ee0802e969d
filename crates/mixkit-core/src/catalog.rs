use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{FieldDef, RelationDef, RelationKind, Scheme};
use crate::types::TypeKey;
use crate::validation::validate_catalog;
use crate::value::Value;

/// Serialized form of a set of schemes, loadable from JSON or TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SchemeDocument {
    /// Contract version for this document format.
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub schemes: Vec<SchemeSpec>,
}

fn default_version() -> String {
    crate::DOCUMENT_VERSION.to_string()
}

/// A scheme entry inside a [`SchemeDocument`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemeSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// A field entry inside a [`SchemeSpec`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    pub name: String,
    /// Declared type key (`str`, `int`, `email`, `varchar`, ...).
    #[serde(rename = "type")]
    pub type_key: TypeKey,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto: bool,
    /// Literal default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationSpec>,
}

/// Relation metadata inside a [`FieldSpec`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RelationSpec {
    pub target: String,
    /// Number of children to build; present means a to-many relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub many: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_ref: Option<String>,
    #[serde(default)]
    pub deferred: bool,
}

impl SchemeDocument {
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|err| Error::Document(err.to_string()))
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Builds the runtime schemes described by the document.
    pub fn into_schemes(self) -> Vec<Scheme> {
        self.schemes.into_iter().map(SchemeSpec::into_scheme).collect()
    }
}

impl SchemeSpec {
    fn into_scheme(self) -> Scheme {
        self.fields
            .into_iter()
            .fold(Scheme::new(self.name), |scheme, field| {
                scheme.field(field.into_field())
            })
    }
}

impl FieldSpec {
    fn into_field(self) -> FieldDef {
        let relation = self.relation.map(|spec| {
            let mut relation = match spec.many {
                Some(count) => RelationDef::to_many(spec.target, count),
                None => RelationDef::to_one(spec.target),
            };
            relation.back_ref = spec.back_ref;
            relation.deferred = relation.deferred || spec.deferred;
            relation
        });
        let to_many = relation
            .as_ref()
            .is_some_and(|rel| matches!(rel.kind, RelationKind::ToMany { .. }));

        let mut field = FieldDef::new(self.name, self.type_key);
        field.nullable = self.nullable || to_many;
        field.unique = self.unique || self.primary_key;
        field.primary_key = self.primary_key;
        field.auto = self.auto;
        field.max_length = self.max_length;
        field.precision = self.precision;
        field.scale = self.scale;
        field.choices = self.choices.iter().map(Value::from_json).collect();
        field.relation = relation;
        if let Some(default) = self.default.as_ref() {
            field = field.default_value(Value::from_json(default));
        }
        field
    }
}

/// Named collection of schemes a backend resolves against.
#[derive(Debug, Clone, Default)]
pub struct SchemeCatalog {
    schemes: BTreeMap<String, Arc<Scheme>>,
}

impl SchemeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a document and validates it.
    pub fn from_document(document: SchemeDocument) -> Result<Self> {
        let mut catalog = Self::new();
        for scheme in document.into_schemes() {
            catalog.insert(scheme);
        }
        validate_catalog(&catalog)?;
        Ok(catalog)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Self::from_document(SchemeDocument::from_json_str(input)?)
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        Self::from_document(SchemeDocument::from_toml_str(input)?)
    }

    /// Loads a `.json` or `.toml` scheme document.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&raw),
            Some("json") => Self::from_json_str(&raw),
            other => Err(Error::Document(format!(
                "unsupported scheme document extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Adds or replaces a scheme.
    pub fn insert(&mut self, scheme: Scheme) -> Arc<Scheme> {
        let scheme = Arc::new(scheme);
        self.schemes.insert(scheme.name.clone(), scheme.clone());
        scheme
    }

    pub fn with(mut self, scheme: Scheme) -> Self {
        self.insert(scheme);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<Scheme>> {
        self.schemes.get(name).cloned()
    }

    /// Resolves a scheme by its full name, or by the last dotted segment
    /// when that segment is unambiguous (`Post` for `blog.Post`).
    pub fn resolve(&self, name: &str) -> Result<Arc<Scheme>> {
        if let Some(scheme) = self.schemes.get(name) {
            return Ok(scheme.clone());
        }

        let mut matches = self
            .schemes
            .iter()
            .filter(|(full, _)| full.rsplit('.').next() == Some(name));
        match (matches.next(), matches.next()) {
            (Some((_, scheme)), None) => Ok(scheme.clone()),
            (Some(_), Some(_)) => Err(Error::SchemeResolution(format!(
                "ambiguous scheme name: {name}"
            ))),
            _ => Err(Error::SchemeResolution(format!("unknown scheme: {name}"))),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    pub fn schemes(&self) -> impl Iterator<Item = &Arc<Scheme>> {
        self.schemes.values()
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}
