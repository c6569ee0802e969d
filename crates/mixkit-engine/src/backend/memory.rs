use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use mixkit_core::{Error, Record, Result, Scheme, SchemeCatalog, Value};

use super::{BackendAdapter, Lookup, PlainBackend};
use crate::field::Field;
use crate::service::Filters;

/// In-process store keyed by scheme name.
///
/// Auto primary keys are assigned at instantiation (1, 2, ...); commits
/// replace records with the same primary key and reject duplicates of
/// other unique fields.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    catalog: PlainBackend,
    store: Mutex<HashMap<String, Vec<Record>>>,
    next_ids: Mutex<HashMap<String, i64>>,
}

impl MemoryBackend {
    pub fn new(catalog: SchemeCatalog) -> Self {
        Self {
            catalog: PlainBackend::new(catalog),
            ..Self::default()
        }
    }

    /// Committed records of `scheme`, in commit order.
    pub fn records(&self, scheme: &str) -> Result<Vec<Record>> {
        let scheme = self.resolve_scheme(scheme)?;
        Ok(self
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&scheme.name)
            .cloned()
            .unwrap_or_default())
    }

    pub fn count(&self, scheme: &str) -> Result<usize> {
        Ok(self.records(scheme)?.len())
    }

    fn next_id(&self, scheme: &str) -> i64 {
        let mut next_ids = self.next_ids.lock().unwrap_or_else(PoisonError::into_inner);
        let next = next_ids.entry(scheme.to_string()).or_insert(0);
        *next += 1;
        *next
    }
}

impl BackendAdapter for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn resolve_scheme(&self, name: &str) -> Result<Arc<Scheme>> {
        self.catalog.resolve_scheme(name)
    }

    fn register_scheme(&self, scheme: Scheme) -> Result<Arc<Scheme>> {
        self.catalog.register_scheme(scheme)
    }

    fn instantiate(&self, scheme: &Scheme, values: Vec<(String, Value)>) -> Result<Record> {
        let mut record = Record::new(scheme.name.clone());
        for (name, value) in values {
            record.set(name, value);
        }
        if let Some(pk) = scheme.primary_key()
            && pk.auto
            && record.get(&pk.name).is_none_or(Value::is_null)
        {
            record.set(pk.name.clone(), Value::Int(self.next_id(&scheme.name)));
        }
        Ok(record)
    }

    fn select_existing(&self, field: &Field, filters: &Filters) -> Result<Lookup<Vec<Value>>> {
        let Some(relation) = field.relation() else {
            return Err(Error::InvalidRelation {
                field: field.name.clone(),
                message: "select needs a relation field".to_string(),
            });
        };
        let target = self.resolve_scheme(&relation.target)?;
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let found: Vec<Value> = store
            .get(&target.name)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| filters.matches(record))
                    .cloned()
                    .map(Value::from)
                    .collect()
            })
            .unwrap_or_default();
        Ok(if found.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Found(found)
        })
    }

    fn guard(&self, scheme: &Scheme, filters: &Filters) -> Result<Lookup<Vec<Record>>> {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let found: Vec<Record> = store
            .get(&scheme.name)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| filters.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(if found.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Found(found)
        })
    }

    fn commit(&self, target: &Record) -> Result<()> {
        let scheme = self.resolve_scheme(target.scheme())?;
        let pk = scheme
            .primary_key()
            .and_then(|pk| target.get(&pk.name).map(|value| (pk.name.as_str(), value.key())));

        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let records = store.entry(scheme.name.clone()).or_default();
        let existing = pk.as_ref().and_then(|(name, key)| {
            records
                .iter()
                .position(|record| record.get(name).is_some_and(|value| value.key() == *key))
        });

        for field in scheme.fields.iter().filter(|field| field.unique && !field.primary_key) {
            let Some(value) = target.get(&field.name).filter(|value| !value.is_null()) else {
                continue;
            };
            let clash = records.iter().enumerate().any(|(idx, record)| {
                Some(idx) != existing
                    && record.get(&field.name).is_some_and(|other| other.key() == value.key())
            });
            if clash {
                return Err(Error::Commit(format!(
                    "duplicate value '{value}' for unique field {}.{}",
                    scheme.name, field.name
                )));
            }
        }

        match existing {
            Some(idx) => records[idx] = target.clone(),
            None => records.push(target.clone()),
        }
        debug!(scheme = %scheme.name, stored = records.len(), "record committed");
        Ok(())
    }

    fn reload(&self, target: &Record) -> Result<Record> {
        let scheme = self.resolve_scheme(target.scheme())?;
        let Some(pk) = scheme.primary_key() else {
            return Err(Error::Commit(format!(
                "scheme '{}' has no primary key to reload by",
                scheme.name
            )));
        };
        let Some(key) = target.get(&pk.name).map(Value::key) else {
            return Err(Error::Commit(format!(
                "record of '{}' has no primary key value",
                scheme.name
            )));
        };
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        store
            .get(&scheme.name)
            .and_then(|records| {
                records
                    .iter()
                    .find(|record| record.get(&pk.name).is_some_and(|value| value.key() == key))
            })
            .cloned()
            .ok_or_else(|| {
                Error::Commit(format!("record {}={key} of '{}' is not stored", pk.name, scheme.name))
            })
    }
}

#[cfg(test)]
mod tests {
    use mixkit_core::FieldDef;

    use super::*;

    fn backend() -> MemoryBackend {
        let user = Scheme::new("User")
            .field(FieldDef::new("id", "int").primary_key().auto())
            .field(FieldDef::new("email", "email").unique());
        MemoryBackend::new(SchemeCatalog::new().with(user))
    }

    fn user(backend: &MemoryBackend, email: &str) -> Record {
        let scheme = backend.resolve_scheme("User").expect("scheme");
        backend
            .instantiate(&scheme, vec![("email".to_string(), Value::from(email))])
            .expect("instantiate")
    }

    #[test]
    fn auto_keys_increment_per_scheme() {
        let backend = backend();
        assert_eq!(user(&backend, "a@x.io").get("id"), Some(&Value::Int(1)));
        assert_eq!(user(&backend, "b@x.io").get("id"), Some(&Value::Int(2)));
    }

    #[test]
    fn commit_rejects_duplicate_unique_values() {
        let backend = backend();
        backend.commit(&user(&backend, "a@x.io")).expect("first commit");
        let result = backend.commit(&user(&backend, "a@x.io"));
        assert!(matches!(result, Err(Error::Commit(_))));
        assert_eq!(backend.count("User").expect("count"), 1);
    }

    #[test]
    fn commit_replaces_by_primary_key_and_reload_reads_it_back() {
        let backend = backend();
        let mut record = user(&backend, "a@x.io");
        backend.commit(&record).expect("commit");
        record.set("email", Value::from("b@x.io"));
        backend.commit(&record).expect("update");

        let reloaded = backend.reload(&record).expect("reload");
        assert_eq!(reloaded.get("email"), Some(&Value::from("b@x.io")));
        assert_eq!(backend.count("User").expect("count"), 1);
    }
}
