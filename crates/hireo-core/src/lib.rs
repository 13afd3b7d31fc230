//! Domain types shared by the notification client: the notification model,
//! identifiers, wire envelopes for the push channel, page context and errors.
//!
//! Nothing in here performs I/O.

pub mod errors;
pub mod ids;
pub mod notification;
pub mod page;
pub mod wire;

pub use errors::{ChannelError, DecodeError, RenderError};
pub use ids::{NotificationId, RelatedId, ToastId};
pub use notification::{ListedNotification, Notification, NotificationKind, RecentEntry};
pub use page::{channel_url, PageContext, Permission, UserIdentity};
pub use wire::{decode, InboundMessage, OutboundMessage};
