//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`,
//! so a settings file only needs the keys it changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tinnhanh_core::provider::{DEFAULT_ARTICLE_MODEL, DEFAULT_REFINE_MODEL};

/// Default Gemini REST endpoint (API-key auth).
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Root settings type.
///
/// ```json
/// {
///   "gemini": { "refineModel": "gemini-2.5-flash", "timeoutMs": 60000 },
///   "logging": { "level": "debug" },
///   "dictionary": { "entries": [{ "short": "Ubnd", "full": "Ủy ban nhân dân" }] }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TinnhanhSettings {
    /// Generative service settings.
    pub gemini: GeminiSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Abbreviation dictionary seeding.
    pub dictionary: DictionarySettings,
}

/// Generative service settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeminiSettings {
    /// REST base URL, without a trailing slash.
    pub base_url: String,
    /// Model used for the refine pipeline.
    pub refine_model: String,
    /// Model used for article synthesis and rewrites.
    pub article_model: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Sampling temperature. `None` leaves the service default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            refine_model: DEFAULT_REFINE_MODEL.to_string(),
            article_model: DEFAULT_ARTICLE_MODEL.to_string(),
            timeout_ms: 120_000,
            temperature: None,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Emit JSON lines.
    pub json: bool,
    /// Per-module levels, e.g. `{"tinnhanh_llm": "debug"}`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            modules: BTreeMap::new(),
        }
    }
}

/// Abbreviation dictionary seeding.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DictionarySettings {
    /// Start from the built-in entries.
    pub seed_defaults: bool,
    /// Extra entries appended after the built-in ones.
    pub entries: Vec<DictionaryEntrySetting>,
}

impl Default for DictionarySettings {
    fn default() -> Self {
        Self {
            seed_defaults: true,
            entries: Vec::new(),
        }
    }
}

/// One user-supplied abbreviation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntrySetting {
    /// Abbreviated form.
    pub short: String,
    /// Expansion.
    pub full: String,
}
