use std::io::Write;

use chrono::Utc;
use hireo_client::{ConnectionStatus, Renderer, Toast};
use hireo_core::{RecentEntry, RenderError, ToastId};
use parking_lot::Mutex;

/// Renders every surface as lines on stdout.
#[derive(Default)]
pub struct ConsoleRenderer {
    last_title: Mutex<Option<String>>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn dropdown_row(entry: &RecentEntry) -> String {
    let n = &entry.notification;
    let marker = if entry.read { ' ' } else { '*' };
    let age = n.age(Utc::now());
    format!("  {marker} [{}] {} {}  {age}", n.id, n.kind.title(), n.content)
        .trim_end()
        .to_string()
}

impl Renderer for ConsoleRenderer {
    // The title already carries the count; the badge is only shown through it.
    fn render_badge(&self, _unread: u32) {}

    fn render_title(&self, title: &str) {
        let mut last = self.last_title.lock();
        if last.as_deref() != Some(title) {
            println!("== {title} ==");
            *last = Some(title.to_string());
        }
    }

    fn render_dropdown(&self, entries: &[RecentEntry]) {
        if entries.is_empty() {
            println!("  No notifications");
            return;
        }
        for entry in entries {
            println!("{}", dropdown_row(entry));
        }
    }

    fn render_status(&self, status: ConnectionStatus) {
        println!("-- {}", status.label());
    }

    fn show_toast(&self, toast: &Toast) {
        println!(">> {}: {}", toast.title, toast.body);
    }

    fn play_sound(&self) -> Result<(), RenderError> {
        let mut out = std::io::stdout().lock();
        out.write_all(b"\x07")
            .and_then(|()| out.flush())
            .map_err(|e| RenderError::Failed(e.to_string()))
    }

    fn show_os_notification(&self, toast: &Toast) -> Result<(), RenderError> {
        println!("!! {} | {}", toast.title, toast.body);
        Ok(())
    }

    fn close_os_notification(&self, _id: &ToastId) {}
}
