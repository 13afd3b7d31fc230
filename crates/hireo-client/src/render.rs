use hireo_core::{Notification, NotificationId, NotificationKind, RecentEntry, RenderError, ToastId};

use crate::state::ConnectionStatus;

/// Transient alert for one incoming notification. Also used for the OS-level
/// notification, which shows the same title and body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub notification_id: NotificationId,
}

impl Toast {
    pub fn for_notification(notification: &Notification) -> Self {
        Self {
            id: ToastId::new(),
            title: notification.kind.title().to_string(),
            body: notification.content.clone(),
            kind: notification.kind,
            notification_id: notification.id.clone(),
        }
    }
}

/// `(N) Title` while anything is unread, plain `Title` otherwise.
pub fn page_title(base: &str, unread: u32) -> String {
    if unread > 0 {
        format!("({unread}) {base}")
    } else {
        base.to_string()
    }
}

/// UI surfaces driven by the client.
///
/// Every method defaults to doing nothing, so a host that lacks a surface
/// (no badge, no dropdown, no OS notifications) simply doesn't override it.
/// Implementations must not block: they run on the client's event loop.
pub trait Renderer: Send + Sync {
    /// Unread badge. Hidden when `unread` is zero.
    fn render_badge(&self, _unread: u32) {}

    fn render_title(&self, _title: &str) {}

    /// Dropdown contents, most recent first.
    fn render_dropdown(&self, _entries: &[RecentEntry]) {}

    /// Connection indicator.
    fn render_status(&self, _status: ConnectionStatus) {}

    fn show_toast(&self, _toast: &Toast) {}

    fn dismiss_toast(&self, _id: &ToastId) {}

    fn play_sound(&self) -> Result<(), RenderError> {
        Err(RenderError::Unavailable("sound"))
    }

    /// Only called when the page was granted notification permission.
    fn show_os_notification(&self, _toast: &Toast) -> Result<(), RenderError> {
        Err(RenderError::Unavailable("os notifications"))
    }

    fn close_os_notification(&self, _id: &ToastId) {}
}

/// Host with no UI at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {}
