//! Router configuration.

use serde::{Deserialize, Serialize};

use crate::path::PatternOptions;

/// Settings applied to every pattern a router compiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Pattern whose chain runs when nothing else matches.
    pub fallback: String,
    /// Match literal segments case-sensitively.
    pub case_sensitive: bool,
    /// Treat a trailing slash as significant.
    pub strict: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            fallback: "/404".to_string(),
            case_sensitive: false,
            strict: false,
        }
    }
}

impl RouterConfig {
    /// Loads a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the fallback pattern.
    #[must_use]
    pub fn fallback(mut self, pattern: impl Into<String>) -> Self {
        self.fallback = pattern.into();
        self
    }

    pub(crate) fn pattern_options(&self) -> PatternOptions {
        PatternOptions {
            case_sensitive: self.case_sensitive,
            strict: self.strict,
        }
    }
}
