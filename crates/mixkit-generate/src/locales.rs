use std::fmt;

use mixkit_core::{Error, Result};

/// Locales the fake-backed generators can produce data for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LocaleKey {
    #[default]
    EnUs,
    FrFr,
    PtBr,
}

impl LocaleKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en_US" | "en-US" | "en" => Some(Self::EnUs),
            "fr_FR" | "fr-FR" | "fr" => Some(Self::FrFr),
            "pt_BR" | "pt-BR" | "pt" => Some(Self::PtBr),
            _ => None,
        }
    }

    /// Like [`LocaleKey::parse`], failing with `InvalidParams`.
    pub fn resolve(value: &str) -> Result<Self> {
        Self::parse(value)
            .ok_or_else(|| Error::InvalidParams(format!("unsupported locale '{value}'")))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::FrFr => "fr_FR",
            Self::PtBr => "pt_BR",
        }
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
