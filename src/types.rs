//! Shared types used across modules
//!
//! This module contains types that are used by multiple modules
//! to avoid circular dependencies.

use serde::{Deserialize, Serialize};

/// Narration locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Pt,
}

impl Locale {
    /// Language tag handed to the speech collaborator
    pub fn as_tag(&self) -> &'static str {
        match self {
            Locale::En => "en-US",
            Locale::Pt => "pt-BR",
        }
    }

    /// Parse from a language tag (`en`, `en-US`, `pt_BR`, ...)
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let lang = lower.split(['-', '_']).next().unwrap_or("");
        match lang {
            "en" => Some(Locale::En),
            "pt" => Some(Locale::Pt),
            _ => None,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Pt => write!(f, "pt"),
        }
    }
}

/// A piece of text available in every supported locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub pt: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, pt: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            pt: pt.into(),
        }
    }

    /// Text for a locale
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Pt => &self.pt,
        }
    }
}

/// Age band used to look up content complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "3-5")]
    Preschool,
    #[serde(rename = "6-8")]
    EarlyPrimary,
    #[serde(rename = "9-12")]
    LatePrimary,
}

impl AgeBand {
    /// Band for a child's age in years
    pub fn for_age(age: u8) -> Self {
        if age <= 5 {
            AgeBand::Preschool
        } else if age <= 8 {
            AgeBand::EarlyPrimary
        } else {
            AgeBand::LatePrimary
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            AgeBand::Preschool => "3-5",
            AgeBand::EarlyPrimary => "6-8",
            AgeBand::LatePrimary => "9-12",
        }
    }
}

impl std::fmt::Display for AgeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
