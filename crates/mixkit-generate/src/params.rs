use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use mixkit_core::{Error, Result, Value};

/// Keyword parameters handed to a generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorParams(BTreeMap<String, Value>);

impl GeneratorParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Copies entries from `other`, overwriting existing keys.
    pub fn merge(&mut self, other: &GeneratorParams) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for GeneratorParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    String,
    Date,
    Time,
    Timestamp,
    List,
}

#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    pub key: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub const fn new(key: &'static str, kind: ParamKind, required: bool) -> Self {
        Self {
            key,
            kind,
            required,
        }
    }
}

/// Validated view over [`GeneratorParams`].
pub struct ParamMap<'a> {
    params: &'a GeneratorParams,
}

/// Rejects unknown keys, mistyped values and missing required keys.
pub fn validate_params<'a>(
    params: &'a GeneratorParams,
    specs: &[ParamSpec],
    ctx: &str,
) -> Result<ParamMap<'a>> {
    for (key, value) in params.iter() {
        let Some(spec) = specs.iter().find(|spec| spec.key == key) else {
            return Err(Error::InvalidParams(format!("{ctx}: unknown param '{key}'")));
        };
        validate_kind(ctx, key, spec.kind, value)?;
    }

    for spec in specs {
        if spec.required && !params.contains(spec.key) {
            return Err(Error::InvalidParams(format!(
                "{ctx}: missing required param '{}'",
                spec.key
            )));
        }
    }

    Ok(ParamMap { params })
}

impl<'a> ParamMap<'a> {
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.params.get(key).and_then(Value::as_i64)
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get_i64(key).and_then(|value| u32::try_from(value).ok())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(Value::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.params.get(key).and_then(Value::as_str)
    }

    pub fn get_list(&self, key: &str) -> Option<&'a [Value]> {
        self.params.get(key).and_then(Value::as_list)
    }

    pub fn get_date(&self, key: &str) -> Option<NaiveDate> {
        self.params.get(key).and_then(|value| match value {
            Value::Text(text) => parse_date_value(text),
            other => other.as_date(),
        })
    }

    pub fn get_time(&self, key: &str) -> Option<NaiveTime> {
        self.params.get(key).and_then(|value| match value {
            Value::Text(text) => parse_time_value(text),
            Value::Time(time) => Some(*time),
            _ => None,
        })
    }

    pub fn get_timestamp(&self, key: &str) -> Option<NaiveDateTime> {
        self.params.get(key).and_then(|value| match value {
            Value::Text(text) => parse_timestamp_value(text),
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        })
    }

    /// Reads a non-negative length, rejecting negative values.
    pub fn length(&self, key: &str, ctx: &str) -> Result<Option<usize>> {
        match self.get_i64(key) {
            None => Ok(None),
            Some(value) if value < 0 => Err(Error::InvalidParams(format!(
                "{ctx}: {key} must be >= 0"
            ))),
            Some(value) => Ok(usize::try_from(value).ok()),
        }
    }
}

fn validate_kind(ctx: &str, key: &str, kind: ParamKind, value: &Value) -> Result<()> {
    let valid = match kind {
        ParamKind::Bool => value.as_bool().is_some(),
        ParamKind::Int => value.as_i64().is_some(),
        ParamKind::Float => value.as_f64().is_some(),
        ParamKind::String => value.as_str().is_some(),
        ParamKind::Date => match value {
            Value::Text(text) => parse_date_value(text).is_some(),
            other => other.as_date().is_some(),
        },
        ParamKind::Time => match value {
            Value::Text(text) => parse_time_value(text).is_some(),
            other => matches!(other, Value::Time(_)),
        },
        ParamKind::Timestamp => match value {
            Value::Text(text) => parse_timestamp_value(text).is_some(),
            other => matches!(other, Value::Timestamp(_)),
        },
        ParamKind::List => value.as_list().is_some(),
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidParams(format!(
            "{ctx}: invalid value for param '{key}'"
        )))
    }
}

pub fn parse_date_value(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn parse_time_value(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .ok()
        .or_else(|| NaiveTime::parse_from_str(value, "%H:%M:%S%.f").ok())
}

pub fn parse_timestamp_value(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.naive_utc())
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[ParamSpec] = &[
        ParamSpec::new("min", ParamKind::Int, false),
        ParamSpec::new("pattern", ParamKind::String, true),
    ];

    #[test]
    fn unknown_param_is_rejected() {
        let params = GeneratorParams::new()
            .with("pattern", "[a-z]+")
            .with("colour", "red");
        let result = validate_params(&params, SPECS, "test");
        assert!(matches!(result, Err(Error::InvalidParams(msg)) if msg.contains("colour")));
    }

    #[test]
    fn missing_required_param_is_rejected() {
        let params = GeneratorParams::new().with("min", 1_i64);
        assert!(validate_params(&params, SPECS, "test").is_err());
    }

    #[test]
    fn date_params_accept_text_or_dates() {
        let specs = &[ParamSpec::new("min", ParamKind::Date, false)];
        let params = GeneratorParams::new().with("min", "2024-02-01");
        let map = validate_params(&params, specs, "test").expect("valid");
        assert_eq!(map.get_date("min"), NaiveDate::from_ymd_opt(2024, 2, 1));

        let bad = GeneratorParams::new().with("min", "yesterday");
        assert!(validate_params(&bad, specs, "test").is_err());
    }
}
