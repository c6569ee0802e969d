use std::fmt;
use std::sync::Arc;

use mixkit_core::{Error, Record, Result, Value};

type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Reference to another value of the target being built, resolved once the
/// target exists.
///
/// Paths are dotted (`author.name`) or use `__` (`author__name`).
#[derive(Clone)]
pub struct Mix {
    path: Vec<String>,
    transform: Option<Transform>,
}

impl Mix {
    pub fn new(path: &str) -> Self {
        let path = path
            .split("__")
            .flat_map(|part| part.split('.'))
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            path,
            transform: None,
        }
    }

    /// Applies `func` to the resolved value.
    pub fn map<F>(mut self, func: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(func));
        self
    }

    pub fn path(&self) -> String {
        self.path.join(".")
    }

    pub fn resolve(&self, target: &Record) -> Result<Value> {
        let value = target
            .lookup(&self.path())
            .cloned()
            .ok_or_else(|| Error::UnresolvedMix(self.path()))?;

        Ok(match self.transform.as_ref() {
            Some(transform) => transform(value),
            None => value,
        })
    }
}

impl fmt::Debug for Mix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mix")
            .field("path", &self.path())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Record {
        let mut author = Record::new("User");
        author.set("name", Value::from("ada"));
        let mut post = Record::new("Post");
        post.set("title", Value::from("hello"));
        post.set("author", Value::from(author));
        post
    }

    #[test]
    fn resolves_nested_paths_in_both_notations() {
        let post = target();
        assert_eq!(Mix::new("author.name").resolve(&post).expect("mix"), Value::from("ada"));
        assert_eq!(Mix::new("author__name").resolve(&post).expect("mix"), Value::from("ada"));
    }

    #[test]
    fn transform_is_applied() {
        let mix = Mix::new("title").map(|value| Value::Text(format!("{value}!")));
        assert_eq!(mix.resolve(&target()).expect("mix"), Value::from("hello!"));
    }

    #[test]
    fn missing_path_fails() {
        let result = Mix::new("author.email").resolve(&target());
        assert!(matches!(result, Err(Error::UnresolvedMix(path)) if path == "author.email"));
    }
}
