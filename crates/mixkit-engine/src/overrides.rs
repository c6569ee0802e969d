use mixkit_core::{Callable, Error, Record, Result, Value};

use crate::mix::Mix;
use crate::sequence::Sequence;
use crate::service::ServiceValue;

/// Caller-supplied value for one field of a blend.
#[derive(Debug, Clone)]
pub enum Override {
    Value(Value),
    /// Invoked once per blend.
    Call(Callable),
    /// Advanced once per blend.
    Sequence(Sequence),
    Service(ServiceValue),
}

impl Override {
    pub fn call<F>(func: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Override::Call(Callable::new(func))
    }

    /// Literal value, if this override is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Override::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Produces the value of a literal, callable or sequence override.
    ///
    /// Service markers are dispatched by the blender and fail here.
    pub(crate) fn evaluate(&self, field: &str) -> Result<Value> {
        match self {
            Override::Value(value) => Ok(value.clone()),
            Override::Call(func) => Ok(func.call()),
            Override::Sequence(sequence) => sequence
                .next()
                .map_err(|_| Error::GeneratorExhausted(field.to_string())),
            Override::Service(service) => Err(Error::InvalidParams(format!(
                "{field}: marker {service:?} is not allowed here"
            ))),
        }
    }
}

impl From<Value> for Override {
    fn from(value: Value) -> Self {
        Override::Value(value)
    }
}

impl From<&str> for Override {
    fn from(value: &str) -> Self {
        Override::Value(Value::from(value))
    }
}

impl From<String> for Override {
    fn from(value: String) -> Self {
        Override::Value(Value::from(value))
    }
}

impl From<i64> for Override {
    fn from(value: i64) -> Self {
        Override::Value(Value::Int(value))
    }
}

impl From<i32> for Override {
    fn from(value: i32) -> Self {
        Override::Value(Value::from(value))
    }
}

impl From<bool> for Override {
    fn from(value: bool) -> Self {
        Override::Value(Value::Bool(value))
    }
}

impl From<f64> for Override {
    fn from(value: f64) -> Self {
        Override::Value(Value::Float(value))
    }
}

impl From<Record> for Override {
    fn from(value: Record) -> Self {
        Override::Value(Value::from(value))
    }
}

impl From<Callable> for Override {
    fn from(value: Callable) -> Self {
        Override::Call(value)
    }
}

impl From<Sequence> for Override {
    fn from(value: Sequence) -> Self {
        Override::Sequence(value)
    }
}

impl From<Mix> for Override {
    fn from(value: Mix) -> Self {
        Override::Service(ServiceValue::Mix(value))
    }
}

impl From<ServiceValue> for Override {
    fn from(value: ServiceValue) -> Self {
        Override::Service(value)
    }
}

/// Ordered field overrides for one blend.
///
/// Keys may address nested relation fields with `__`
/// (`author__name = "ada"`).
#[derive(Debug, Clone, Default)]
pub struct Overrides(Vec<(String, Override)>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Override>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces `key`, keeping its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Override>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Override> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Override)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits `__` keys: top-level entries plus nested params per prefix,
    /// both in first-seen order.
    pub(crate) fn split_nested(&self) -> (Vec<(String, Override)>, Vec<(String, Overrides)>) {
        let mut direct = Vec::new();
        let mut nested: Vec<(String, Overrides)> = Vec::new();
        for (key, value) in &self.0 {
            match key.split_once("__") {
                Some((prefix, rest)) if !prefix.is_empty() && !rest.is_empty() => {
                    match nested.iter_mut().find(|(name, _)| name == prefix) {
                        Some((_, params)) => params.insert(rest, value.clone()),
                        None => nested.push((
                            prefix.to_string(),
                            Overrides::new().set(rest, value.clone()),
                        )),
                    }
                }
                _ => direct.push((key.clone(), value.clone())),
            }
        }
        (direct, nested)
    }
}

impl<K: Into<String>, V: Into<Override>> FromIterator<(K, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overrides = Overrides::new();
        for (key, value) in iter {
            overrides.insert(key, value);
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let overrides = Overrides::new().set("a", 1).set("b", 2).set("a", 3);
        let keys: Vec<&str> = overrides.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(overrides.get("a").and_then(Override::as_value), Some(&Value::Int(3)));
    }

    #[test]
    fn nested_keys_group_by_first_prefix() {
        let overrides = Overrides::new()
            .set("title", "x")
            .set("author__name", "ada")
            .set("author__profile__bio", "hi");
        let (direct, nested) = overrides.split_nested();
        assert_eq!(direct.len(), 1);
        assert_eq!(nested.len(), 1);
        let (prefix, params) = &nested[0];
        assert_eq!(prefix, "author");
        assert!(params.get("name").is_some());
        assert!(params.get("profile__bio").is_some());
    }

    #[test]
    fn exhausted_sequence_names_the_field() {
        let value = Override::from(Sequence::from_iter(Vec::<i64>::new()));
        let result = value.evaluate("code");
        assert!(matches!(result, Err(Error::GeneratorExhausted(field)) if field == "code"));
    }
}
