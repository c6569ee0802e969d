use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use mixkit_core::Result;

/// Verbosity of the engine's own `tracing` events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// True when an event at `level` should be emitted under this setting.
    pub fn allows(self, level: LogLevel) -> bool {
        level <= self
    }
}

/// Engine-wide parameters of a [`crate::Mixer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerParams {
    /// Prefer realistic fake data over plain random values.
    pub fake: bool,
    /// Persist every blended record through the backend.
    pub commit: bool,
    pub locale: String,
    pub log_level: LogLevel,
    /// Swallow blend failures and return `None` instead.
    pub silence: bool,
    /// Seed for reproducible runs; random when absent.
    pub seed: Option<u64>,
}

impl Default for MixerParams {
    fn default() -> Self {
        Self {
            fake: true,
            commit: true,
            locale: "en_US".to_string(),
            log_level: LogLevel::Warn,
            silence: false,
            seed: None,
        }
    }
}

impl MixerParams {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Applies the fields set in `patch`.
    pub fn apply(&mut self, patch: &ParamsPatch) {
        if let Some(fake) = patch.fake {
            self.fake = fake;
        }
        if let Some(commit) = patch.commit {
            self.commit = commit;
        }
        if let Some(locale) = patch.locale.as_ref() {
            self.locale = locale.clone();
        }
        if let Some(log_level) = patch.log_level {
            self.log_level = log_level;
        }
        if let Some(silence) = patch.silence {
            self.silence = silence;
        }
    }
}

/// Partial update of [`MixerParams`], applied by `Mixer::ctx`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsPatch {
    pub fake: Option<bool>,
    pub commit: Option<bool>,
    pub locale: Option<String>,
    pub log_level: Option<LogLevel>,
    pub silence: Option<bool>,
}

impl ParamsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fake(mut self, fake: bool) -> Self {
        self.fake = Some(fake);
        self
    }

    pub fn commit(mut self, commit: bool) -> Self {
        self.commit = Some(commit);
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = Some(log_level);
        self
    }

    pub fn silence(mut self, silence: bool) -> Self {
        self.silence = Some(silence);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let params = MixerParams::from_toml_str("fake = false\nlog_level = \"debug\"\nseed = 7")
            .expect("parse params");
        assert!(!params.fake);
        assert!(params.commit);
        assert_eq!(params.locale, "en_US");
        assert_eq!(params.log_level, LogLevel::Debug);
        assert_eq!(params.seed, Some(7));
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut params = MixerParams::default();
        params.apply(&ParamsPatch::new().commit(false).locale("pt_BR"));
        assert!(params.fake);
        assert!(!params.commit);
        assert_eq!(params.locale, "pt_BR");
    }

    #[test]
    fn log_level_ordering() {
        assert!(LogLevel::Info.allows(LogLevel::Warn));
        assert!(!LogLevel::Warn.allows(LogLevel::Info));
    }
}
