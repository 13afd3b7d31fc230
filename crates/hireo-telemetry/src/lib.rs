//! Logging setup for the notification client.

use std::str::FromStr;

use hireo_settings::LoggingSettings;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("unknown log level `{0}`")]
    InvalidLevel(String),
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Configuration for the telemetry subsystem.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Default log level. Overridden by RUST_LOG env var.
    pub log_level: Level,
    /// Per-module level overrides (e.g. "hireo_client" => DEBUG).
    pub module_levels: Vec<(String, Level)>,
    /// Emit one JSON object per line instead of human-readable output.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            module_levels: Vec::new(),
            json: false,
        }
    }
}

impl TelemetryConfig {
    pub fn from_settings(settings: &LoggingSettings) -> Result<Self, TelemetryError> {
        Ok(Self {
            log_level: parse_level(&settings.level)?,
            module_levels: Vec::new(),
            json: settings.json,
        })
    }

    pub fn with_module_level(mut self, module: impl Into<String>, level: Level) -> Self {
        self.module_levels.push((module.into(), level));
        self
    }

    /// Filter directives equivalent to this config, e.g. `info,hireo_client=debug`.
    pub fn filter_directives(&self) -> String {
        let mut filter = self.log_level.to_string().to_lowercase();
        for (module, level) in &self.module_levels {
            filter.push_str(&format!(",{}={}", module, level.to_string().to_lowercase()));
        }
        filter
    }
}

pub fn parse_level(raw: &str) -> Result<Level, TelemetryError> {
    Level::from_str(raw.trim()).map_err(|_| TelemetryError::InvalidLevel(raw.to_string()))
}

/// Initialize the global subscriber, writing to stderr. Call once at startup.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_list(true)
    });
    let text_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives() {
        assert_eq!(TelemetryConfig::default().filter_directives(), "info");
    }

    #[test]
    fn module_directives() {
        let config = TelemetryConfig::default()
            .with_module_level("hireo_client", Level::DEBUG)
            .with_module_level("tungstenite", Level::WARN);
        assert_eq!(
            config.filter_directives(),
            "info,hireo_client=debug,tungstenite=warn"
        );
    }

    #[test]
    fn from_settings_parses_level() {
        let settings = LoggingSettings {
            level: "Debug".into(),
            json: true,
        };
        let config = TelemetryConfig::from_settings(&settings).unwrap();
        assert_eq!(config.log_level, Level::DEBUG);
        assert!(config.json);
    }

    #[test]
    fn from_settings_rejects_unknown_level() {
        let settings = LoggingSettings {
            level: "loud".into(),
            json: false,
        };
        let err = TelemetryConfig::from_settings(&settings).unwrap_err();
        assert_eq!(err.to_string(), "unknown log level `loud`");
    }
}
