//! Blending engine for mixkit.
//!
//! A [`Mixer`] resolves schemes through a [`BackendAdapter`], builds records
//! field by field with the generator registry, and optionally persists them.
//! Per-scheme state (uniqueness ledger, producer cache, registered producers
//! and middleware) lives in cached [`TypeMixer`]s.
//!
//! ```no_run
//! use mixkit_core::{FieldDef, Scheme, SchemeCatalog};
//! use mixkit_engine::{Mixer, Overrides};
//!
//! let catalog = SchemeCatalog::new().with(
//!     Scheme::new("User")
//!         .field(FieldDef::new("id", "int").primary_key().auto())
//!         .field(FieldDef::new("name", "str")),
//! );
//! let mixer = Mixer::from_catalog(catalog);
//! let user = mixer.blend("User", &Overrides::new().set("name", "ada"))?;
//! # Ok::<(), mixkit_core::Error>(())
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod field;
pub mod logging;
pub mod mix;
pub mod mixer;
pub mod overrides;
pub mod sequence;
pub mod service;
pub mod type_mixer;

pub use backend::{BackendAdapter, Lookup, MemoryBackend, PlainBackend, Producer};
pub use cache::{TypeMixerCache, TypeMixerKey};
pub use config::{LogLevel, MixerParams, ParamsPatch};
pub use field::Field;
pub use logging::{LoggingOptions, init_logging};
pub use mix::Mix;
pub use mixer::{Blendable, CtxGuard, Cycle, Guarded, Mixer};
pub use overrides::{Override, Overrides};
pub use sequence::Sequence;
pub use service::{Filters, ServiceValue};
pub use type_mixer::{BlendContext, Middleware, MiddlewareId, TypeMixer};
