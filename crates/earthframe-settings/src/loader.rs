//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`EarthFrameSettings::default()`]
//! 2. If `~/.earthframe/settings.json` exists, deep-merge it over the defaults
//! 3. Apply `EARTHFRAME_*` environment overrides
//!
//! Deep merge rules:
//! - Objects merge recursively, source keys win
//! - Arrays and primitives are replaced by the source
//! - `null` in the source keeps the target value

use std::path::{Path, PathBuf};

use earthframe_protocol::{DisplayMode, Language};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::EarthFrameSettings;

/// Overrides [`EarthFrameSettings::base_url`].
pub const ENV_BASE_URL: &str = "EARTHFRAME_BASE_URL";
/// Overrides [`EarthFrameSettings::log_level`].
pub const ENV_LOG_LEVEL: &str = "EARTHFRAME_LOG_LEVEL";
/// Overrides the handshake language.
pub const ENV_LANGUAGE: &str = "EARTHFRAME_LANGUAGE";
/// Overrides the handshake display mode, `1` to `3`.
pub const ENV_DISPLAY_MODE: &str = "EARTHFRAME_DISPLAY_MODE";

/// Resolve the path to the settings file (`~/.earthframe/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".earthframe").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<EarthFrameSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields the defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<EarthFrameSettings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<EarthFrameSettings> {
    let defaults = serde_json::to_value(EarthFrameSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
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

/// Apply `EARTHFRAME_*` environment overrides.
///
/// Invalid values are logged and ignored.
pub fn apply_env_overrides(settings: &mut EarthFrameSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable source.
pub fn apply_overrides<F>(settings: &mut EarthFrameSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = read_string(&lookup, ENV_BASE_URL) {
        settings.base_url = v;
    }
    if let Some(v) = read_string(&lookup, ENV_LOG_LEVEL) {
        settings.log_level = v;
    }
    if let Some(v) = read_parsed::<Language, _>(&lookup, ENV_LANGUAGE) {
        settings.map_config.language = Some(v);
    }
    if let Some(v) = read_parsed::<DisplayMode, _>(&lookup, ENV_DISPLAY_MODE) {
        settings.map_config.display_mode = Some(v);
    }
}

fn read_string<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn read_parsed<T, F>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let val = read_string(lookup, name)?;
    match val.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(key = name, value = %val, error = %e, "invalid env var, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use earthframe_core::DEFAULT_BASE_URL;
    use earthframe_core::logging::capture_logs;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"mapConfig": {"language": "en-US", "graticules": true}});
        let source = serde_json::json!({"mapConfig": {"language": "fr-FR"}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["mapConfig"]["language"], "fr-FR");
        assert_eq!(merged["mapConfig"]["graticules"], true);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"viewPort": [1, 2, 3]});
        let source = serde_json::json!({"viewPort": [4]});
        assert_eq!(deep_merge(target, source)["viewPort"], serde_json::json!([4]));
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"baseUrl": "a", "logLevel": "warn"});
        let source = serde_json::json!({"baseUrl": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["baseUrl"], "a");
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        assert_eq!(deep_merge(target, source)["a"], 42);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let settings = read_settings_file(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings, EarthFrameSettings::default());
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"logLevel": "debug", "mapConfig": {"displayMode": 2, "ajaxBar": false}}"#,
        )
        .unwrap();

        let settings = read_settings_file(&path).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.map_config.display_mode, Some(DisplayMode::Flat));
        assert_eq!(settings.map_config.ajax_bar, Some(false));
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result, Err(SettingsError::Json(_))));
    }

    #[test]
    fn load_out_of_range_display_mode_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"mapConfig": {"displayMode": 9}}"#).unwrap();

        assert!(matches!(read_settings_file(&path), Err(SettingsError::Json(_))));
    }

    #[test]
    fn load_empty_base_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"baseUrl": ""}"#).unwrap();

        assert!(matches!(
            load_settings_from_path(&path),
            Err(SettingsError::InvalidValue(_))
        ));
    }

    // ── overrides ───────────────────────────────────────────────────

    #[test]
    fn overrides_apply_over_file_values() {
        let mut settings = EarthFrameSettings::default();
        apply_overrides(
            &mut settings,
            vars(&[
                (ENV_BASE_URL, "https://maps.example/"),
                (ENV_LOG_LEVEL, "earthframe_core=trace"),
                (ENV_LANGUAGE, "ru-RU"),
                (ENV_DISPLAY_MODE, "1"),
            ]),
        );
        assert_eq!(settings.base_url, "https://maps.example/");
        assert_eq!(settings.log_level, "earthframe_core=trace");
        assert_eq!(settings.map_config.language, Some(Language::RuRu));
        assert_eq!(settings.map_config.display_mode, Some(DisplayMode::Columbus));
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut settings = EarthFrameSettings::default();
        apply_overrides(&mut settings, vars(&[(ENV_BASE_URL, ""), (ENV_LOG_LEVEL, "  ")]));
        assert_eq!(settings, EarthFrameSettings::default());
    }

    #[test]
    fn invalid_values_are_logged_and_ignored() {
        let (logs, _guard) = capture_logs();
        let mut settings = EarthFrameSettings::default();
        apply_overrides(
            &mut settings,
            vars(&[(ENV_DISPLAY_MODE, "4"), (ENV_LANGUAGE, "klingon")]),
        );
        assert!(settings.map_config.is_empty());
        assert_eq!(logs.count_at_level(tracing::Level::WARN), 2);
        assert!(
            logs.events()
                .iter()
                .any(|e| e.field("key") == Some(ENV_DISPLAY_MODE))
        );
    }

    #[test]
    fn settings_path_ends_in_dotdir() {
        let path = settings_path();
        assert!(path.ends_with(".earthframe/settings.json"));
    }
}
