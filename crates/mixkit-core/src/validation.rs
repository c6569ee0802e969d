use std::collections::BTreeSet;

use crate::catalog::SchemeCatalog;
use crate::error::{Error, Result};

/// Validate internal consistency of a scheme catalog.
///
/// This checks:
/// - duplicate field names within a scheme
/// - at most one primary key per scheme
/// - relation targets resolve inside the catalog
/// - back-reference fields exist on the relation target
pub fn validate_catalog(catalog: &SchemeCatalog) -> Result<()> {
    for scheme in catalog.schemes() {
        let mut fields = BTreeSet::new();
        for field in &scheme.fields {
            if !fields.insert(field.name.as_str()) {
                return Err(Error::InvalidScheme(format!(
                    "duplicate field name: {}.{}",
                    scheme.name, field.name
                )));
            }
        }

        let primary_keys = scheme.fields.iter().filter(|field| field.primary_key).count();
        if primary_keys > 1 {
            return Err(Error::InvalidScheme(format!(
                "more than one primary key on {}",
                scheme.name
            )));
        }

        for field in &scheme.fields {
            let Some(relation) = field.relation.as_ref() else {
                continue;
            };
            let target = catalog.resolve(&relation.target).map_err(|_| {
                Error::InvalidScheme(format!(
                    "relation target not found: {}.{} -> {}",
                    scheme.name, field.name, relation.target
                ))
            })?;
            if let Some(back_ref) = relation.back_ref.as_deref() {
                if target.get(back_ref).is_none() {
                    return Err(Error::InvalidScheme(format!(
                        "back reference field not found: {}.{}",
                        target.name, back_ref
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, Scheme};

    #[test]
    fn rejects_duplicate_fields() {
        let catalog = SchemeCatalog::new().with(
            Scheme::new("User")
                .field(FieldDef::new("name", "str"))
                .field(FieldDef::new("name", "text")),
        );
        assert!(matches!(
            validate_catalog(&catalog),
            Err(Error::InvalidScheme(_))
        ));
    }

    #[test]
    fn rejects_missing_back_reference() {
        let catalog = SchemeCatalog::new()
            .with(Scheme::new("Comment").field(FieldDef::new("body", "text")))
            .with(
                Scheme::new("Post")
                    .field(FieldDef::new("id", "int").primary_key().auto())
                    .field(FieldDef::to_many("comments", "Comment", 2).back_ref("post_id")),
            );
        let err = validate_catalog(&catalog).expect_err("missing back_ref");
        assert!(err.to_string().contains("Comment.post_id"));
    }
}
