use hireo_core::{InboundMessage, Notification, NotificationId, RecentEntry};

/// Lifecycle of the push-channel connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
        }
    }
}

/// Most-recent-first list of notifications, in arrival order, bounded by
/// `capacity`. The oldest entry is evicted on overflow.
#[derive(Clone, Debug)]
pub struct RecentList {
    entries: Vec<RecentEntry>,
    capacity: usize,
}

impl RecentList {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RecentEntry] {
        &self.entries
    }

    pub fn get(&self, id: &NotificationId) -> Option<&RecentEntry> {
        self.entries.iter().find(|e| &e.notification.id == id)
    }

    /// Insert at the front; returns the evicted tail entry, if any.
    pub fn push_front(&mut self, notification: Notification) -> Option<RecentEntry> {
        if self.capacity == 0 {
            return None;
        }
        self.entries.insert(0, RecentEntry::unread(notification));
        if self.entries.len() > self.capacity {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Mark an entry read in place. Returns `None` when the id is not in the
    /// list, otherwise whether the entry was still unread.
    pub fn mark_read(&mut self, id: &NotificationId) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| &e.notification.id == id)?;
        let was_unread = !entry.read;
        entry.read = true;
        Some(was_unread)
    }

    /// Ids of entries not yet marked read, in list order.
    pub fn unread_ids(&self) -> Vec<NotificationId> {
        self.entries
            .iter()
            .filter(|e| !e.read)
            .map(|e| e.notification.id.clone())
            .collect()
    }

    /// Replace the contents with a server-provided list (already newest first).
    pub fn replace(&mut self, entries: impl IntoIterator<Item = RecentEntry>) {
        self.entries = entries.into_iter().take(self.capacity).collect();
    }
}

/// What a message changed, so the client knows which side effects to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    CountReplaced { count: u32 },
    Arrived { notification: Notification },
    Read { id: NotificationId, found: bool },
    ListReplaced { len: usize },
    Ignored,
}

/// Unread count plus the recent list.
#[derive(Clone, Debug)]
pub struct NotificationState {
    unread: u32,
    recent: RecentList,
}

impl NotificationState {
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            unread: 0,
            recent: RecentList::new(recent_capacity),
        }
    }

    pub fn unread(&self) -> u32 {
        self.unread
    }

    pub fn recent(&self) -> &RecentList {
        &self.recent
    }

    /// Optimistic read for a locally requested `mark_read`. Only an entry that
    /// is in the list and still unread moves the count. Returns whether
    /// anything changed.
    pub fn mark_read_locally(&mut self, id: &NotificationId) -> bool {
        if self.recent.mark_read(id) == Some(true) {
            self.unread = self.unread.saturating_sub(1);
            true
        } else {
            false
        }
    }

    pub fn apply(&mut self, message: InboundMessage) -> Applied {
        match message {
            InboundMessage::NotificationCount { count } => {
                self.unread = count;
                Applied::CountReplaced { count }
            }
            InboundMessage::NewNotification { notification } => {
                let _ = self.recent.push_front(notification.clone());
                self.unread = self.unread.saturating_add(1);
                Applied::Arrived { notification }
            }
            InboundMessage::NotificationRead { notification_id } => {
                let marked = self.recent.mark_read(&notification_id);
                // Already counted when the read was applied locally.
                if marked != Some(false) {
                    self.unread = self.unread.saturating_sub(1);
                }
                Applied::Read {
                    id: notification_id,
                    found: marked.is_some(),
                }
            }
            InboundMessage::NotificationsList { notifications } => {
                self.recent
                    .replace(notifications.into_iter().map(RecentEntry::from));
                Applied::ListReplaced {
                    len: self.recent.len(),
                }
            }
            InboundMessage::Unknown => Applied::Ignored,
        }
    }
}
