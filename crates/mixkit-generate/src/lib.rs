//! Generator registry and built-in value generators for mixkit.
//!
//! Generators are resolved by declared type, with aliases, ancestor types
//! and name-based fake overrides, and draw from a caller-supplied RNG so
//! seeded runs are reproducible.

pub mod generators;
pub mod locales;
pub mod params;

pub use generators::{
    Generator, GeneratorContext, GeneratorRegistry, default_registry,
};
pub use locales::LocaleKey;
pub use params::GeneratorParams;
