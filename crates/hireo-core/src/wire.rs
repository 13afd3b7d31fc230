use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DecodeError;
use crate::ids::NotificationId;
use crate::notification::{ListedNotification, Notification};

/// Messages pushed by the server, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Authoritative unread count, sent on connect and on resync.
    NotificationCount { count: u32 },
    NewNotification { notification: Notification },
    /// A read was confirmed, by this session or another one.
    NotificationRead { notification_id: NotificationId },
    /// Reply to `get_notifications`: the latest notifications, newest first.
    NotificationsList {
        notifications: Vec<ListedNotification>,
    },
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::NotificationCount { .. } => "notification_count",
            Self::NewNotification { .. } => "new_notification",
            Self::NotificationRead { .. } => "notification_read",
            Self::NotificationsList { .. } => "notifications_list",
            Self::Unknown => "unknown",
        }
    }
}

/// Decode one text frame.
pub fn decode(raw: &str) -> Result<InboundMessage, DecodeError> {
    let value: Value = serde_json::from_str(raw).map_err(DecodeError::NotJson)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_owned();
    serde_json::from_value(value).map_err(|e| DecodeError::InvalidPayload {
        kind,
        reason: e.to_string(),
    })
}

/// Requests sent to the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    MarkRead { notification_id: NotificationId },
    GetNotifications,
}

impl OutboundMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
