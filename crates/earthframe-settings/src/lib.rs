//! # earthframe-settings
//!
//! Layered configuration for embedding the map frame.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`EarthFrameSettings::default()`]
//! 2. **User file**: `~/.earthframe/settings.json`, deep-merged over defaults
//! 3. **Environment variables**: `EARTHFRAME_*` overrides
//!
//! [`EarthFrameSettings::to_frame_options`] turns the result into the
//! options an `EarthFrame` is constructed with.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::EarthFrameSettings;

/// Install the stderr `tracing` subscriber at the configured level.
pub fn init_logging(settings: &EarthFrameSettings) {
    earthframe_core::logging::init_subscriber(&settings.log_level);
}
