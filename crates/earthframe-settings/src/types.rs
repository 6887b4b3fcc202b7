//! Settings type definitions.
//!
//! Field names are camelCase on disk. Every field has a default, so a
//! settings file only needs the keys it changes.

use earthframe_core::{DEFAULT_BASE_URL, FrameOptions};
use earthframe_protocol::MapConfig;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings for an embedded map frame.
///
/// ```json
/// {
///   "baseUrl": "https://deep-time.org/map/#/showcase",
///   "logLevel": "debug",
///   "mapConfig": { "language": "en-US", "displayMode": 3 }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EarthFrameSettings {
    /// Address the map is loaded from.
    pub base_url: String,
    /// Default `tracing` filter, used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Configuration pushed during the handshake.
    pub map_config: MapConfig,
}

impl Default for EarthFrameSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            log_level: "warn".to_string(),
            map_config: MapConfig::default(),
        }
    }
}

impl EarthFrameSettings {
    /// Reject settings no frame could start with.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(SettingsError::InvalidValue("baseUrl is empty".into()));
        }
        if self.log_level.trim().is_empty() {
            return Err(SettingsError::InvalidValue("logLevel is empty".into()));
        }
        Ok(())
    }

    /// Construction options for an `EarthFrame`.
    pub fn to_frame_options(&self) -> FrameOptions {
        FrameOptions::new()
            .with_base_url(self.base_url.clone())
            .with_initial_config(self.map_config.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use earthframe_protocol::{DisplayMode, Language};
    use serde_json::json;

    #[test]
    fn defaults() {
        let settings = EarthFrameSettings::default();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.log_level, "warn");
        assert!(settings.map_config.is_empty());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(EarthFrameSettings::default()).unwrap();
        assert!(value.get("baseUrl").is_some());
        assert!(value.get("logLevel").is_some());
        assert_eq!(value["mapConfig"], json!({}));
    }

    #[test]
    fn files_written_with_a_version_key_still_load() {
        let settings: EarthFrameSettings =
            serde_json::from_value(json!({"version": "1", "logLevel": "info"})).unwrap();
        assert_eq!(settings.log_level, "info");
        let value = serde_json::to_value(&settings).unwrap();
        assert!(value.get("version").is_none());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: EarthFrameSettings =
            serde_json::from_value(json!({"logLevel": "debug"})).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn frame_options_carry_url_and_config() {
        let settings = EarthFrameSettings {
            base_url: "https://maps.example/#/embed".into(),
            map_config: MapConfig {
                language: Some(Language::EsEs),
                display_mode: Some(DisplayMode::Globe),
                ..MapConfig::default()
            },
            ..EarthFrameSettings::default()
        };
        let options = settings.to_frame_options();
        assert_eq!(options.base_url, "https://maps.example/#/embed");
        assert_eq!(
            options.initial_config,
            json!({"language": "es-ES", "displayMode": 3})
        );
    }

    #[test]
    fn empty_base_url_is_invalid() {
        let settings = EarthFrameSettings {
            base_url: "  ".into(),
            ..EarthFrameSettings::default()
        };
        assert_matches!(settings.validate(), Err(SettingsError::InvalidValue(_)));
    }
}
