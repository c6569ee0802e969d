//! Storage/ORM integration points.
//!
//! The engine never touches storage directly: scheme lookup, field
//! metadata, instantiation and persistence all go through a
//! [`BackendAdapter`].

use std::fmt;
use std::sync::Arc;

use rand::{Rng, RngCore};

use mixkit_core::types::builtin;
use mixkit_core::{
    Callable, Error, FieldDefault, Record, Result, Scheme, TypeKey, Value,
};
use mixkit_generate::{
    Generator, GeneratorContext, GeneratorParams, GeneratorRegistry, LocaleKey,
};

use crate::field::Field;
use crate::sequence::Sequence;
use crate::service::Filters;

mod memory;
mod plain;

pub use memory::MemoryBackend;
pub use plain::PlainBackend;

/// Result of a storage lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

/// Ready-to-call value source for one field.
#[derive(Clone)]
pub enum Producer {
    Generator {
        generator: Arc<dyn Generator>,
        params: GeneratorParams,
        type_key: TypeKey,
        locale: LocaleKey,
    },
    Constant(Value),
    Call(Callable),
    Sequence(Sequence),
    /// Uniform pick from a fixed set.
    Choice(Vec<Value>),
}

impl Producer {
    pub fn produce(&self, field_name: &str, rng: &mut dyn RngCore) -> Result<Value> {
        match self {
            Producer::Generator {
                generator,
                params,
                type_key,
                locale,
            } => {
                let ctx = GeneratorContext {
                    field_name,
                    type_key,
                    locale: *locale,
                };
                generator.generate(&ctx, params, rng)
            }
            Producer::Constant(value) => Ok(value.clone()),
            Producer::Call(func) => Ok(func.call()),
            Producer::Sequence(sequence) => sequence
                .next()
                .map_err(|_| Error::GeneratorExhausted(field_name.to_string())),
            Producer::Choice(values) if values.is_empty() => Err(Error::InvalidParams(format!(
                "{field_name}: nothing to choose from"
            ))),
            Producer::Choice(values) => Ok(values[rng.random_range(0..values.len())].clone()),
        }
    }

    /// Adds generator params; other producers take none.
    pub(crate) fn with_params(self, extra: &GeneratorParams) -> Result<Self> {
        match self {
            Producer::Generator {
                generator,
                mut params,
                type_key,
                locale,
            } => {
                params.merge(extra);
                Ok(Producer::Generator {
                    generator,
                    params,
                    type_key,
                    locale,
                })
            }
            other if extra.is_empty() => Ok(other),
            _ => Err(Error::InvalidParams(
                "params are only accepted by generated fields".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Generator {
                generator, params, ..
            } => f
                .debug_struct("Generator")
                .field("id", &generator.id())
                .field("params", params)
                .finish(),
            Producer::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Producer::Call(func) => f.debug_tuple("Call").field(func).finish(),
            Producer::Sequence(sequence) => f.debug_tuple("Sequence").field(sequence).finish(),
            Producer::Choice(values) => f.debug_tuple("Choice").field(values).finish(),
        }
    }
}

/// Contract between the blending engine and a storage layer.
///
/// Only [`BackendAdapter::name`] and [`BackendAdapter::resolve_scheme`] are
/// required; the rest default to in-process behaviour with no persistence.
pub trait BackendAdapter: Send + Sync {
    /// Short identifier used in logs (e.g. `memory`).
    fn name(&self) -> &'static str;

    fn resolve_scheme(&self, name: &str) -> Result<Arc<Scheme>>;

    /// Makes a scheme resolvable at runtime.
    fn register_scheme(&self, scheme: Scheme) -> Result<Arc<Scheme>> {
        Err(Error::InvalidScheme(format!(
            "backend '{}' cannot register scheme '{}'",
            self.name(),
            scheme.name
        )))
    }

    fn enumerate_fields(&self, scheme: &Scheme) -> Vec<Field> {
        scheme
            .fields
            .iter()
            .cloned()
            .map(|def| Field::new(Arc::new(def)))
            .collect()
    }

    fn get_default(&self, field: &Field) -> Option<Value> {
        field.def.default.as_ref().map(FieldDefault::produce)
    }

    /// Fields with params are always built; nullable and storage-assigned
    /// fields are otherwise left unset.
    fn is_required(&self, field: &Field) -> bool {
        if !field.params.is_empty() {
            return true;
        }
        !(field.def.nullable || field.def.auto)
    }

    fn is_unique(&self, field: &Field) -> bool {
        field.def.unique
    }

    /// Maps field metadata to a generator and its params.
    fn make_generator(
        &self,
        registry: &GeneratorRegistry,
        field: &Field,
        field_name: &str,
        fake: bool,
        locale: LocaleKey,
    ) -> Result<Producer> {
        let def = &field.def;
        let mut params = GeneratorParams::new();

        if !def.choices.is_empty() {
            let type_key = TypeKey::new(builtin::CHOICE);
            let generator = registry.resolve(&type_key, None, false)?;
            params.insert("choices", Value::List(def.choices.clone()));
            return Ok(Producer::Generator {
                generator,
                params,
                type_key,
                locale,
            });
        }

        let generator = registry.resolve(&def.type_key, Some(field_name), fake)?;
        match registry.simple_type(&def.type_key).as_ref().map(TypeKey::as_str) {
            Some(builtin::STR | builtin::TEXT) => {
                if let Some(max_length) = def.max_length {
                    params.insert("max_len", Value::Int(max_length as i64));
                }
            }
            Some(builtin::DECIMAL | builtin::POSITIVE_DECIMAL) => {
                if let Some(precision) = def.precision {
                    params.insert("precision", Value::Int(i64::from(precision)));
                }
                if let Some(scale) = def.scale {
                    params.insert("scale", Value::Int(i64::from(scale)));
                }
            }
            _ => {}
        }

        Ok(Producer::Generator {
            generator,
            params,
            type_key: def.type_key.clone(),
            locale,
        })
    }

    /// Builds the target from first-pass values, in order.
    fn instantiate(&self, scheme: &Scheme, values: Vec<(String, Value)>) -> Result<Record> {
        let mut record = Record::new(scheme.name.clone());
        for (name, value) in values {
            record.set(name, value);
        }
        Ok(record)
    }

    /// Applies second-pass values to the built target.
    fn postprocess(&self, mut target: Record, deferred: Vec<(String, Value)>) -> Result<Record> {
        for (name, value) in deferred {
            target.set(name, value);
        }
        Ok(target)
    }

    /// Stored objects a `Select` marker may pick from; the engine picks one
    /// at random.
    fn select_existing(&self, _field: &Field, _filters: &Filters) -> Result<Lookup<Vec<Value>>> {
        Ok(Lookup::NotFound)
    }

    /// Finds stored records matching a guard.
    fn guard(&self, _scheme: &Scheme, _filters: &Filters) -> Result<Lookup<Vec<Record>>> {
        Ok(Lookup::NotFound)
    }

    fn commit(&self, _target: &Record) -> Result<()> {
        Ok(())
    }

    /// Returns the stored state of `target`.
    fn reload(&self, target: &Record) -> Result<Record> {
        Ok(target.clone())
    }
}
