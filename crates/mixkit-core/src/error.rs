use thiserror::Error;

/// Error type shared across mixkit crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The scheme argument could not be resolved to a known scheme.
    #[error("invalid scheme: {0}")]
    SchemeResolution(String),
    /// A scheme definition violates internal invariants.
    #[error("invalid scheme definition: {0}")]
    InvalidScheme(String),
    /// No generator could be resolved for a declared type.
    #[error("no generator for type '{type_key}' (field '{field}')")]
    Generation { type_key: String, field: String },
    /// The unique-value retry bound was exceeded.
    #[error("cannot generate a unique value for '{field}' after {attempts} attempts")]
    UniquenessExhausted { field: String, attempts: u32 },
    /// A sequence override produced no element.
    #[error("sequence for '{0}' is exhausted")]
    GeneratorExhausted(String),
    /// Relation params were supplied for a field with no resolvable relation target.
    #[error("invalid relation '{field}': {message}")]
    InvalidRelation { field: String, message: String },
    /// Backend persistence failed.
    #[error("commit failed: {0}")]
    Commit(String),
    /// Generator parameters were rejected.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// A `Select` marker found nothing in storage.
    #[error("cannot find a value for the field '{0}'")]
    SelectNotFound(String),
    /// A `Mix` path did not resolve against the built target.
    #[error("cannot resolve mix path '{0}'")]
    UnresolvedMix(String),
    /// A registered middleware rejected the target.
    #[error("middleware failed: {0}")]
    Middleware(String),
    /// A scheme or parameter document could not be parsed.
    #[error("invalid document: {0}")]
    Document(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Failure raised while blending a scheme, with the scheme attached.
    #[error("mixer ({scheme}): {source}")]
    Blend {
        scheme: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps an error with the name of the scheme being blended.
    pub fn in_scheme(self, scheme: impl Into<String>) -> Self {
        match self {
            already @ Error::Blend { .. } => already,
            other => Error::Blend {
                scheme: scheme.into(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, skipping scheme wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Blend { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Document(err.to_string())
    }
}

/// Convenience alias for results returned by mixkit crates.
pub type Result<T> = std::result::Result<T, Error>;
