//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`NotifySettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `HIREO_*` environment overrides
//! 4. Validate

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::NotifySettings;

/// Resolve the path to the settings file (`~/.hireo/notify.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".hireo").join("notify.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<NotifySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<NotifySettings> {
    let mut settings = read_file_layer(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn read_file_layer(path: &Path) -> Result<NotifySettings> {
    let defaults = serde_json::to_value(NotifySettings::default())?;

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
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
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

/// Apply `HIREO_*` environment variable overrides.
pub fn apply_env_overrides(settings: &mut NotifySettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from any variable source. Invalid values are ignored with
/// a warning, leaving the file/default value in place.
pub fn apply_overrides(settings: &mut NotifySettings, lookup: impl Fn(&str) -> Option<String>) {
    let env = EnvReader { lookup };

    if let Some(v) = env.string("HIREO_CHANNEL_PATH") {
        settings.channel.path = v;
    }
    if let Some(v) = env.u64("HIREO_CONNECT_TIMEOUT_MS", 100, 600_000) {
        settings.channel.connect_timeout_ms = v;
    }
    if let Some(v) = env.u64("HIREO_RECONNECT_BASE_MS", 1, 600_000) {
        settings.reconnect.base_delay_ms = v;
    }
    if let Some(v) = env.u64("HIREO_RECONNECT_MAX_ATTEMPTS", 0, 100) {
        settings.reconnect.max_attempts = v as u32;
    }
    if let Some(v) = env.u64("HIREO_TOAST_MS", 100, 600_000) {
        settings.display.toast_duration_ms = v;
    }
    if let Some(v) = env.bool("HIREO_SOUND") {
        settings.display.sound_enabled = v;
    }
    if let Some(v) = env.string("HIREO_TITLE") {
        settings.display.title = v;
    }
    if let Some(v) = env.bool("HIREO_SYNC_ON_CONNECT") {
        settings.sync.request_list_on_connect = v;
    }
    if let Some(v) = env.string("HIREO_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.bool("HIREO_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.lookup)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = (self.lookup)(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid integer env var, ignoring");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"display": {"title": "Hireo", "soundEnabled": true}});
        let source = serde_json::json!({"display": {"title": "Jobs"}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["display"]["title"], "Jobs");
        assert_eq!(merged["display"]["soundEnabled"], true);
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4]});
        assert_eq!(deep_merge(target, source)["items"], serde_json::json!([4]));
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        assert_eq!(deep_merge(target, source)["a"], 42);
    }

    // ── file layer ──────────────────────────────────────────────────

    #[test]
    fn missing_file_returns_defaults() {
        let settings = read_file_layer(Path::new("/nonexistent/notify.json")).unwrap();
        assert_eq!(settings, NotifySettings::default());
    }

    #[test]
    fn partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify.json");
        std::fs::write(
            &path,
            r#"{"reconnect": {"maxAttempts": 8}, "channel": {"path": "/ws/alerts/"}}"#,
        )
        .unwrap();

        let settings = read_file_layer(&path).unwrap();
        assert_eq!(settings.reconnect.max_attempts, 8);
        assert_eq!(settings.reconnect.base_delay_ms, 1000);
        assert_eq!(settings.channel.path, "/ws/alerts/");
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = read_file_layer(&path);
        assert!(matches!(result, Err(SettingsError::Json(_))));
    }

    #[test]
    fn out_of_range_file_value_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify.json");
        std::fs::write(&path, r#"{"display": {"recentLimit": 0}}"#).unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
    }

    // ── overrides ───────────────────────────────────────────────────

    #[test]
    fn overrides_apply() {
        let mut settings = NotifySettings::default();
        apply_overrides(
            &mut settings,
            vars(&[
                ("HIREO_CHANNEL_PATH", "/ws/other/"),
                ("HIREO_CONNECT_TIMEOUT_MS", "2500"),
                ("HIREO_TOAST_MS", "8000"),
                ("HIREO_RECONNECT_BASE_MS", "250"),
                ("HIREO_RECONNECT_MAX_ATTEMPTS", "3"),
                ("HIREO_SOUND", "off"),
                ("HIREO_SYNC_ON_CONNECT", "yes"),
                ("HIREO_LOG_JSON", "1"),
                ("HIREO_TITLE", "Careers"),
            ]),
        );
        assert_eq!(settings.channel.path, "/ws/other/");
        assert_eq!(settings.channel.connect_timeout_ms, 2500);
        assert_eq!(settings.display.toast_duration_ms, 8000);
        assert_eq!(settings.reconnect.base_delay_ms, 250);
        assert_eq!(settings.reconnect.max_attempts, 3);
        assert!(!settings.display.sound_enabled);
        assert!(settings.sync.request_list_on_connect);
        assert!(settings.logging.json);
        assert_eq!(settings.display.title, "Careers");
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut settings = NotifySettings::default();
        apply_overrides(
            &mut settings,
            vars(&[
                ("HIREO_RECONNECT_BASE_MS", "0"),
                ("HIREO_CONNECT_TIMEOUT_MS", "50"),
                ("HIREO_TOAST_MS", "99"),
                ("HIREO_RECONNECT_MAX_ATTEMPTS", "many"),
                ("HIREO_SOUND", "maybe"),
                ("HIREO_TITLE", ""),
            ]),
        );
        assert_eq!(settings, NotifySettings::default());
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn parse_range_bounds() {
        assert_eq!(parse_u64_range("5", 0, 10), Some(5));
        assert_eq!(parse_u64_range("10", 0, 10), Some(10));
        assert_eq!(parse_u64_range("11", 0, 10), None);
        assert_eq!(parse_u64_range("-1", 0, 10), None);
    }
}
