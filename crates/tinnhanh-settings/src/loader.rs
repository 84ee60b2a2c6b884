//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`TinnhanhSettings::default()`]
//! 2. If `~/.tinnhanh/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `TINNHANH_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::TinnhanhSettings;

/// Environment variable names recognized by [`apply_env_overrides`].
pub mod env_vars {
    pub const BASE_URL: &str = "TINNHANH_GEMINI_BASE_URL";
    pub const REFINE_MODEL: &str = "TINNHANH_REFINE_MODEL";
    pub const ARTICLE_MODEL: &str = "TINNHANH_ARTICLE_MODEL";
    pub const TIMEOUT_MS: &str = "TINNHANH_TIMEOUT_MS";
    pub const TEMPERATURE: &str = "TINNHANH_TEMPERATURE";
    pub const LOG_LEVEL: &str = "TINNHANH_LOG_LEVEL";
    pub const LOG_JSON: &str = "TINNHANH_LOG_JSON";
    pub const SEED_DICTIONARY: &str = "TINNHANH_SEED_DICTIONARY";
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Resolve the path to the settings file (`~/.tinnhanh/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".tinnhanh").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<TinnhanhSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<TinnhanhSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

fn load_file_layer(path: &Path) -> Result<TinnhanhSettings> {
    let defaults = serde_json::to_value(TinnhanhSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `TINNHANH_*` environment variable overrides.
///
/// Invalid values are ignored with a warning and the file/default value stays.
pub fn apply_env_overrides(settings: &mut TinnhanhSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides using `lookup` as the variable source.
pub fn apply_overrides_from(
    settings: &mut TinnhanhSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let string = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = string(env_vars::BASE_URL) {
        settings.gemini.base_url = v.trim().trim_end_matches('/').to_string();
    }
    if let Some(v) = string(env_vars::REFINE_MODEL) {
        settings.gemini.refine_model = v.trim().to_string();
    }
    if let Some(v) = string(env_vars::ARTICLE_MODEL) {
        settings.gemini.article_model = v.trim().to_string();
    }
    if let Some(v) = read_parsed(&lookup, env_vars::TIMEOUT_MS, |s| {
        parse_u64_range(s, 1000, 600_000)
    }) {
        settings.gemini.timeout_ms = v;
    }
    if let Some(v) = read_parsed(&lookup, env_vars::TEMPERATURE, |s| {
        parse_f64_range(s, 0.0, 2.0)
    }) {
        settings.gemini.temperature = Some(v);
    }
    if let Some(v) = read_parsed(&lookup, env_vars::LOG_LEVEL, parse_log_level) {
        settings.logging.level = v;
    }
    if let Some(v) = read_parsed(&lookup, env_vars::LOG_JSON, parse_bool) {
        settings.logging.json = v;
    }
    if let Some(v) = read_parsed(&lookup, env_vars::SEED_DICTIONARY, parse_bool) {
        settings.dictionary.seed_defaults = v;
    }
}

fn read_parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let val = lookup(name)?;
    let result = parse(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid env var, ignoring");
    }
    result
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a finite `f64` within a range.
pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.trim().parse().ok()?;
    (n.is_finite() && n >= min && n <= max).then_some(n)
}

/// Normalize a log level name, rejecting unknown ones.
pub fn parse_log_level(val: &str) -> Option<String> {
    let lower = val.trim().to_lowercase();
    LOG_LEVELS.contains(&lower.as_str()).then_some(lower)
}
