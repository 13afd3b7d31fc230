//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every section is `#[serde(default)]`,
//! so a partial file only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings for the notification client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifySettings {
    pub channel: ChannelSettings,
    pub reconnect: ReconnectSettings,
    pub display: DisplaySettings,
    pub sync: SyncSettings,
    pub logging: LoggingSettings,
}

impl NotifySettings {
    /// Reject values the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.display.recent_limit == 0 {
            return Err(SettingsError::InvalidValue(
                "display.recentLimit must be at least 1".into(),
            ));
        }
        if self.reconnect.base_delay_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "reconnect.baseDelayMs must be at least 1".into(),
            ));
        }
        if self.channel.connect_timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "channel.connectTimeoutMs must be at least 1".into(),
            ));
        }
        if !self.channel.path.starts_with('/') {
            return Err(SettingsError::InvalidValue(format!(
                "channel.path must be absolute, got `{}`",
                self.channel.path
            )));
        }
        Ok(())
    }
}

/// Push-channel endpoint, relative to the page origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelSettings {
    pub path: String,
    /// Handshake limit; an expired handshake counts as a failed connect.
    pub connect_timeout_ms: u64,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            path: "/ws/notifications/".to_string(),
            connect_timeout_ms: 10_000,
        }
    }
}

/// Exponential backoff between reconnect attempts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconnectSettings {
    /// Delay before the first retry; doubled for each further attempt.
    pub base_delay_ms: u64,
    /// Retries after which the client stays disconnected.
    pub max_attempts: u32,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_attempts: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub recent_limit: usize,
    pub toast_duration_ms: u64,
    pub os_notification_duration_ms: u64,
    pub sound_enabled: bool,
    /// Page title shown after the `(N)` unread prefix.
    pub title: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            recent_limit: 10,
            toast_duration_ms: 5000,
            os_notification_duration_ms: 5000,
            sound_enabled: true,
            title: "Hireo".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// Send `get_notifications` after every successful connect.
    pub request_list_on_connect: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
