//! # tinnhanh-settings
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`TinnhanhSettings::default()`]
//! 2. **User file**: `~/.tinnhanh/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `TINNHANH_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

static SETTINGS: OnceLock<TinnhanhSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// Loads on first call and caches; falls back to compiled defaults if loading fails.
pub fn get_settings() -> &'static TinnhanhSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// Returns the value back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: TinnhanhSettings) -> std::result::Result<(), TinnhanhSettings> {
    SETTINGS.set(settings)
}
