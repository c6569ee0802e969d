//! Core contracts and helpers for mixkit.
//!
//! This crate defines the dynamic value model, scheme descriptors, scheme
//! documents and the error taxonomy shared by the generator registry and the
//! blending engine.

pub mod catalog;
pub mod error;
pub mod schema;
pub mod types;
pub mod validation;
pub mod value;

pub use catalog::{FieldSpec, RelationSpec, SchemeCatalog, SchemeDocument, SchemeSpec};
pub use error::{Error, Result};
pub use schema::{FieldDef, FieldDefault, RelationDef, RelationKind, Scheme};
pub use types::{Callable, TypeKey, builtin};
pub use validation::validate_catalog;
pub use value::{Record, Value};

/// Current contract version for scheme documents.
pub const DOCUMENT_VERSION: &str = "0.1";
