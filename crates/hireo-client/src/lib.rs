//! Real-time notification client.
//!
//! Keeps one push-channel connection per page, reconnects with exponential
//! backoff, mirrors the server's unread count and recent notifications, and
//! drives the UI surfaces through a [`Renderer`].

pub mod backoff;
pub mod channel;
pub mod client;
pub mod render;
pub mod state;

pub use backoff::{ReconnectPolicy, Reconnector};
pub use channel::{Channel, ChannelEvent, Connector, WsConnector};
pub use client::{ClientConfig, ClientHandle, ClientSnapshot, NotificationClient};
pub use render::{page_title, NullRenderer, Renderer, Toast};
pub use state::{Applied, ConnectionStatus, NotificationState, RecentList};
