use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NotificationId, RelatedId};

/// Category of a notification, as tagged by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewJobPosting,
    #[serde(
        alias = "application_status",
        alias = "application_received",
        alias = "application_viewed"
    )]
    ApplicationUpdate,
    #[serde(alias = "interview_reminder")]
    InterviewScheduled,
    System,
    #[serde(alias = "new_message", alias = "message_received")]
    Message,
    /// Kinds this client does not know yet.
    #[serde(other)]
    Other,
}

impl NotificationKind {
    /// Heading used for toasts and OS notifications.
    pub fn title(self) -> &'static str {
        match self {
            Self::NewJobPosting => "New Job Posting",
            Self::ApplicationUpdate => "Application Update",
            Self::InterviewScheduled => "Interview Scheduled",
            Self::System => "System Notification",
            Self::Message => "New Message",
            Self::Other => "Notification",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewJobPosting => "new_job_posting",
            Self::ApplicationUpdate => "application_update",
            Self::InterviewScheduled => "interview_scheduled",
            Self::System => "system",
            Self::Message => "message",
            Self::Other => "other",
        }
    }
}

/// A notification pushed by the server. Immutable once received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub content: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<RelatedId>,
}

impl Notification {
    /// Parse `created_at`. Accepts RFC 3339, or a naive ISO-8601 timestamp
    /// which is taken as UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Relative age for list display, e.g. "5m ago". Empty when the
    /// timestamp cannot be parsed.
    pub fn age(&self, now: DateTime<Utc>) -> String {
        let Some(created) = self.created_at_utc() else {
            return String::new();
        };
        let secs = (now - created).num_seconds().max(0);
        match secs {
            0..=59 => "just now".to_string(),
            60..=3_599 => format!("{}m ago", secs / 60),
            3_600..=86_399 => format!("{}h ago", secs / 3_600),
            _ => format!("{}d ago", secs / 86_400),
        }
    }
}

/// One row of a `notifications_list` response; carries the server's read flag.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ListedNotification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub related_id: Option<RelatedId>,
    #[serde(default)]
    pub is_read: bool,
}

impl From<ListedNotification> for RecentEntry {
    fn from(listed: ListedNotification) -> Self {
        Self {
            notification: Notification {
                id: listed.id,
                kind: listed.kind,
                content: listed.content,
                created_at: listed.created_at,
                related_id: listed.related_id,
            },
            read: listed.is_read,
        }
    }
}

/// A notification as held in the dropdown list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecentEntry {
    pub notification: Notification,
    /// Marked read visually; the entry keeps its position.
    pub read: bool,
}

impl RecentEntry {
    pub fn unread(notification: Notification) -> Self {
        Self {
            notification,
            read: false,
        }
    }
}
