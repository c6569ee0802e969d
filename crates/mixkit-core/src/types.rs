use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Declared type of a field, used as the generator lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TypeKey(String);

impl TypeKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TypeKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Names of the built-in simple types.
pub mod builtin {
    pub const BOOL: &str = "bool";
    pub const INT: &str = "int";
    pub const SMALL_INT: &str = "small_int";
    pub const BIG_INT: &str = "big_int";
    pub const POSITIVE_INT: &str = "positive_int";
    pub const POSITIVE_SMALL_INT: &str = "positive_small_int";
    pub const FLOAT: &str = "float";
    pub const DECIMAL: &str = "decimal";
    pub const POSITIVE_DECIMAL: &str = "positive_decimal";
    pub const STR: &str = "str";
    pub const TEXT: &str = "text";
    pub const BYTES: &str = "bytes";
    pub const UUID: &str = "uuid";
    pub const DATE: &str = "date";
    pub const DATETIME: &str = "datetime";
    pub const TIME: &str = "time";
    pub const LIST: &str = "list";
    pub const SET: &str = "set";
    pub const TUPLE: &str = "tuple";
    pub const DICT: &str = "dict";
    pub const NULL_OR_BOOL: &str = "null_or_bool";
    pub const NONE: &str = "none";
    pub const EMAIL: &str = "email";
    pub const HOSTNAME: &str = "hostname";
    pub const IP4: &str = "ip4";
    pub const IP6: &str = "ip6";
    pub const IP: &str = "ip";
    pub const URL: &str = "url";
    pub const CHOICE: &str = "choice";
}

/// Zero-argument value factory (field defaults, registered producers,
/// callable overrides).
#[derive(Clone)]
pub struct Callable(Arc<dyn Fn() -> Value + Send + Sync>);

impl Callable {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(func))
    }

    pub fn call(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}
