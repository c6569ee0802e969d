use mixkit_core::{Record, TypeKey, Value};

use crate::mix::Mix;

/// Equality filters used by `Select` markers and guards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(Vec<(String, Value)>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((field.into(), value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every filter matches; paths may be dotted or use `__`.
    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|(field, expected)| {
            record
                .lookup(&field.replace("__", "."))
                .is_some_and(|actual| actual.key() == expected.key())
        })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

/// Marker overrides that change how a field is produced rather than
/// supplying its value.
#[derive(Debug, Clone)]
pub enum ServiceValue {
    /// Generate in fake mode, optionally as another declared type.
    Fake(Option<TypeKey>),
    /// Generate in random mode, optionally as another declared type.
    Random(Option<TypeKey>),
    /// Pick one of the given values.
    RandomFrom(Vec<Value>),
    /// Use an existing stored object matching the filters.
    Select(Filters),
    /// Copy another value of the target once it exists.
    Mix(Mix),
    /// Leave the field unset.
    Skip,
}
