use std::sync::Arc;
use std::time::Duration;

use hireo_core::{
    channel_url, decode, ChannelError, NotificationId, OutboundMessage, PageContext, Permission,
    ToastId,
};
use futures::future::{BoxFuture, FutureExt};
use hireo_settings::NotifySettings;
use metrics::counter;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::backoff::{ReconnectPolicy, Reconnector};
use crate::channel::{Channel, ChannelEvent, Connector};
use crate::render::{page_title, Renderer, Toast};
use crate::state::{Applied, ConnectionStatus, NotificationState};

const COMMAND_QUEUE: usize = 64;

/// Client tuning. Defaults match the production page script.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub channel_path: String,
    /// Upper bound on one handshake. Expiry counts as a failed connect.
    pub connect_timeout: Duration,
    pub reconnect: ReconnectPolicy,
    pub recent_limit: usize,
    pub toast_duration: Duration,
    pub os_notification_duration: Duration,
    pub sound_enabled: bool,
    pub request_list_on_connect: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            channel_path: "/ws/notifications/".to_string(),
            connect_timeout: Duration::from_secs(10),
            reconnect: ReconnectPolicy::default(),
            recent_limit: 10,
            toast_duration: Duration::from_secs(5),
            os_notification_duration: Duration::from_secs(5),
            sound_enabled: true,
            request_list_on_connect: false,
        }
    }
}

impl From<&NotifySettings> for ClientConfig {
    fn from(settings: &NotifySettings) -> Self {
        Self {
            channel_path: settings.channel.path.clone(),
            connect_timeout: Duration::from_millis(settings.channel.connect_timeout_ms),
            reconnect: ReconnectPolicy::from(&settings.reconnect),
            recent_limit: settings.display.recent_limit,
            toast_duration: Duration::from_millis(settings.display.toast_duration_ms),
            os_notification_duration: Duration::from_millis(
                settings.display.os_notification_duration_ms,
            ),
            sound_enabled: settings.display.sound_enabled,
            request_list_on_connect: settings.sync.request_list_on_connect,
        }
    }
}

/// Observable summary, republished after every state change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientSnapshot {
    pub status: ConnectionStatus,
    pub unread: u32,
}

#[derive(Debug)]
enum Command {
    MarkRead(NotificationId),
    MarkAllRead,
    Refresh,
    DismissToast(ToastId),
    CloseOsNotification(ToastId),
}

/// Cloneable front end for a running client.
#[derive(Clone, Debug)]
pub struct ClientHandle {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<ClientSnapshot>,
}

impl ClientHandle {
    /// Ask the server to mark one notification read. Applied locally once
    /// sent; dropped if disconnected.
    pub async fn mark_read(&self, id: NotificationId) {
        let _ = self.commands.send(Command::MarkRead(id)).await;
    }

    /// One `mark_read` per unread entry in the recent list.
    pub async fn mark_all_read(&self) {
        let _ = self.commands.send(Command::MarkAllRead).await;
    }

    /// Request the latest notifications from the server.
    pub async fn refresh(&self) {
        let _ = self.commands.send(Command::Refresh).await;
    }

    /// The user clicked a toast.
    pub async fn dismiss_toast(&self, id: ToastId) {
        let _ = self.commands.send(Command::DismissToast(id)).await;
    }

    pub fn snapshot(&self) -> ClientSnapshot {
        *self.snapshot.borrow()
    }

    /// Wait for the next snapshot change. Errors once the client has stopped.
    pub async fn changed(&mut self) -> Result<ClientSnapshot, watch::error::RecvError> {
        self.snapshot.changed().await?;
        Ok(*self.snapshot.borrow_and_update())
    }
}

/// Connection to the notification push channel plus the local notification
/// state it keeps in sync.
///
/// All transitions happen on one task (see [`NotificationClient::run`]):
/// channel events, handle commands and timers are processed one at a time.
pub struct NotificationClient {
    config: ClientConfig,
    page: PageContext,
    connector: Arc<dyn Connector>,
    renderer: Arc<dyn Renderer>,
    state: NotificationState,
    status: ConnectionStatus,
    reconnect: Reconnector,
    channel: Option<Box<dyn Channel>>,
    retry: Option<ScheduledRetry>,
    commands: Option<mpsc::Receiver<Command>>,
    timers: mpsc::WeakSender<Command>,
    snapshot: watch::Sender<ClientSnapshot>,
}

#[derive(Clone, Copy, Debug)]
struct ScheduledRetry {
    at: Instant,
    delay: Duration,
}

type ConnectResult = Result<Box<dyn Channel>, ChannelError>;

/// Handshake in flight, polled by the event loop next to commands and timers.
type PendingConnect = BoxFuture<'static, (Url, ConnectResult)>;

enum Event {
    Connected(Url, ConnectResult),
    Channel(Result<ChannelEvent, ChannelError>),
    Command(Option<Command>),
    RetryDue,
}

impl NotificationClient {
    /// Build a client for the page. Returns `None`, and never connects, when
    /// the page has no signed-in user.
    pub fn activate(
        page: PageContext,
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        renderer: Arc<dyn Renderer>,
    ) -> Option<(Self, ClientHandle)> {
        let Some(user) = page.current_user() else {
            debug!("no signed-in user, notification client stays inert");
            return None;
        };
        debug!(user_id = %user.id, username = ?user.username, "activating notification client");

        let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
        let (snapshot_tx, snapshot_rx) = watch::channel(ClientSnapshot::default());
        let client = Self {
            state: NotificationState::new(config.recent_limit),
            reconnect: Reconnector::new(config.reconnect.clone()),
            config,
            page,
            connector,
            renderer,
            status: ConnectionStatus::Disconnected,
            channel: None,
            retry: None,
            commands: Some(rx),
            timers: tx.downgrade(),
            snapshot: snapshot_tx,
        };
        let handle = ClientHandle {
            commands: tx,
            snapshot: snapshot_rx,
        };
        Some((client, handle))
    }

    /// Activate and run the client on its own task.
    pub fn spawn(
        page: PageContext,
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        renderer: Arc<dyn Renderer>,
    ) -> Option<(ClientHandle, tokio::task::JoinHandle<()>)> {
        let (client, handle) = Self::activate(page, config, connector, renderer)?;
        Some((handle, tokio::spawn(client.run())))
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect.attempts()
    }

    /// Delay of the pending reconnect, if one is scheduled.
    pub fn scheduled_retry(&self) -> Option<Duration> {
        self.retry.map(|r| r.delay)
    }

    /// Open the channel and wait for the handshake to finish. Does nothing
    /// unless currently disconnected.
    pub async fn connect(&mut self) {
        if let Some(pending) = self.begin_connect() {
            let (url, result) = pending.await;
            self.finish_connect(&url, result).await;
        }
    }

    /// Move to Connecting and return the handshake future, or `None` when
    /// already active or when no attempt could be started.
    fn begin_connect(&mut self) -> Option<PendingConnect> {
        if self.status != ConnectionStatus::Disconnected {
            debug!(status = self.status.label(), "connect ignored, channel already active");
            return None;
        }
        self.retry = None;
        self.set_status(ConnectionStatus::Connecting);
        counter!("notify_connect_attempts_total").increment(1);

        let url = match channel_url(&self.page.origin, &self.config.channel_path) {
            Ok(url) => url,
            Err(e) => {
                warn!(origin = %self.page.origin, error = %e, "cannot build channel url");
                self.on_disconnect(Some(e.to_string()));
                return None;
            }
        };

        let connector = Arc::clone(&self.connector);
        let limit = self.config.connect_timeout;
        Some(
            async move {
                let result = match tokio::time::timeout(limit, connector.connect(&url)).await {
                    Ok(result) => result,
                    Err(_) => Err(ChannelError::ConnectFailed(format!(
                        "handshake timed out after {}ms",
                        limit.as_millis()
                    ))),
                };
                (url, result)
            }
            .boxed(),
        )
    }

    async fn finish_connect(&mut self, url: &Url, result: ConnectResult) {
        match result {
            Ok(channel) => self.on_open(channel).await,
            Err(e) => {
                warn!(url = %url, error = %e, kind = e.error_kind(), "channel connect failed");
                self.on_disconnect(Some(e.to_string()));
            }
        }
    }

    async fn on_open(&mut self, channel: Box<dyn Channel>) {
        self.reconnect.reset();
        self.channel = Some(channel);
        self.set_status(ConnectionStatus::Connected);
        info!("notification channel connected");

        if self.config.request_list_on_connect {
            self.send(OutboundMessage::GetNotifications).await;
        }
    }

    /// The channel closed or failed. Schedules a retry unless attempts are used up.
    pub fn on_disconnect(&mut self, reason: Option<String>) {
        self.channel = None;
        self.set_status(ConnectionStatus::Disconnected);

        match self.reconnect.next_delay() {
            Some(delay) => {
                counter!("notify_reconnects_scheduled_total").increment(1);
                warn!(
                    attempt = self.reconnect.attempts(),
                    max_attempts = self.reconnect.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    reason = reason.as_deref().unwrap_or("closed"),
                    "notification channel disconnected, reconnect scheduled"
                );
                self.retry = Some(ScheduledRetry {
                    at: Instant::now() + delay,
                    delay,
                });
            }
            None => {
                error!(
                    attempts = self.reconnect.attempts(),
                    reason = reason.as_deref().unwrap_or("closed"),
                    "notification channel disconnected, giving up"
                );
                self.retry = None;
            }
        }
    }

    /// Handle one inbound text frame. Malformed frames are logged and dropped.
    pub fn handle_text(&mut self, raw: &str) {
        let message = match decode(raw) {
            Ok(message) => message,
            Err(e) => {
                counter!("notify_malformed_messages_total").increment(1);
                warn!(error = %e, kind = e.error_kind(), len = raw.len(), "dropping malformed message");
                return;
            }
        };
        let message_type = message.message_type();
        counter!("notify_messages_total", "type" => message_type).increment(1);

        match self.state.apply(message) {
            Applied::Ignored => {
                debug!(message_type, "ignoring message");
            }
            Applied::Arrived { notification } => {
                debug!(notification_id = %notification.id, kind = notification.kind.as_str(), "notification arrived");
                self.render();
                self.alert(&Toast::for_notification(&notification));
            }
            Applied::Read { id, found } => {
                debug!(notification_id = %id, found, "notification read");
                self.render();
            }
            Applied::CountReplaced { count } => {
                debug!(count, "unread count replaced");
                self.render();
            }
            Applied::ListReplaced { len } => {
                debug!(len, "recent list replaced");
                self.render();
            }
        }
    }

    /// Request that the server mark `id` read, and mark it read locally
    /// without waiting for confirmation. Silently dropped when not connected.
    pub async fn mark_read(&mut self, id: NotificationId) {
        let sent = self
            .send(OutboundMessage::MarkRead {
                notification_id: id.clone(),
            })
            .await;
        if sent && self.state.mark_read_locally(&id) {
            debug!(notification_id = %id, "marked read locally");
            self.render();
        }
    }

    pub async fn mark_all_read(&mut self) {
        for id in self.state.recent().unread_ids() {
            self.mark_read(id).await;
        }
    }

    pub async fn refresh(&mut self) {
        self.send(OutboundMessage::GetNotifications).await;
    }

    /// Process events until the client can do nothing more: every handle is
    /// gone and the channel is down with no connect or retry pending.
    pub async fn run(mut self) {
        self.render();
        let mut pending = self.begin_connect();

        loop {
            if pending.is_none()
                && self.channel.is_none()
                && self.retry.is_none()
                && self.commands.is_none()
            {
                break;
            }

            let event = match (pending.as_mut(), &mut self.channel, self.retry) {
                (Some(connecting), _, _) => tokio::select! {
                    (url, result) = connecting => Event::Connected(url, result),
                    cmd = next_command(&mut self.commands) => Event::Command(cmd),
                },
                (None, Some(channel), _) => tokio::select! {
                    ev = channel.recv() => Event::Channel(ev),
                    cmd = next_command(&mut self.commands) => Event::Command(cmd),
                },
                (None, None, Some(retry)) => tokio::select! {
                    () = tokio::time::sleep_until(retry.at) => Event::RetryDue,
                    cmd = next_command(&mut self.commands) => Event::Command(cmd),
                },
                (None, None, None) => Event::Command(next_command(&mut self.commands).await),
            };

            match event {
                Event::Connected(url, result) => {
                    pending = None;
                    self.finish_connect(&url, result).await;
                }
                Event::Channel(Ok(ChannelEvent::Text(text))) => self.handle_text(&text),
                Event::Channel(Ok(ChannelEvent::Closed(reason))) => self.on_disconnect(reason),
                Event::Channel(Err(e)) => self.on_disconnect(Some(e.to_string())),
                Event::RetryDue => {
                    self.retry = None;
                    pending = self.begin_connect();
                }
                Event::Command(Some(command)) => self.handle_command(command).await,
                Event::Command(None) => {
                    debug!("all client handles dropped");
                    self.commands = None;
                }
            }
        }
        debug!(status = self.status.label(), "notification client stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::MarkRead(id) => self.mark_read(id).await,
            Command::MarkAllRead => self.mark_all_read().await,
            Command::Refresh => self.refresh().await,
            Command::DismissToast(id) => self.renderer.dismiss_toast(&id),
            Command::CloseOsNotification(id) => self.renderer.close_os_notification(&id),
        }
    }

    /// Returns whether the message was handed to the channel.
    async fn send(&mut self, message: OutboundMessage) -> bool {
        let Some(channel) = self.channel.as_mut() else {
            counter!("notify_outbound_dropped_total").increment(1);
            debug!(?message, "not connected, dropping outbound message");
            return false;
        };
        let text = match message.encode() {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "failed to encode outbound message");
                return false;
            }
        };
        match channel.send(text).await {
            Ok(()) => true,
            Err(e) => {
                counter!("notify_outbound_dropped_total").increment(1);
                debug!(error = %e, kind = e.error_kind(), "outbound send failed, dropping");
                false
            }
        }
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
        self.renderer.render_status(status);
        self.publish();
    }

    /// Re-render every state-derived surface.
    fn render(&self) {
        let unread = self.state.unread();
        self.renderer.render_badge(unread);
        self.renderer.render_title(&page_title(&self.page.title, unread));
        self.renderer.render_dropdown(self.state.recent().entries());
        self.publish();
    }

    fn publish(&self) {
        self.snapshot.send_replace(ClientSnapshot {
            status: self.status,
            unread: self.state.unread(),
        });
    }

    /// Toast, sound and OS notification for a new arrival. Sound and OS
    /// failures are swallowed.
    fn alert(&self, toast: &Toast) {
        self.renderer.show_toast(toast);
        self.expire_after(self.config.toast_duration, Command::DismissToast(toast.id.clone()));

        if self.config.sound_enabled {
            if let Err(e) = self.renderer.play_sound() {
                debug!(error = %e, "notification sound skipped");
            }
        }

        if self.page.notification_permission == Permission::Granted {
            match self.renderer.show_os_notification(toast) {
                Ok(()) => self.expire_after(
                    self.config.os_notification_duration,
                    Command::CloseOsNotification(toast.id.clone()),
                ),
                Err(e) => debug!(error = %e, "os notification skipped"),
            }
        }
    }

    /// Post `command` back to this client after `delay`. Fire-and-forget.
    fn expire_after(&self, delay: Duration, command: Command) {
        let Some(tx) = self.timers.upgrade() else {
            return;
        };
        drop(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(command).await;
        }));
    }
}

async fn next_command(commands: &mut Option<mpsc::Receiver<Command>>) -> Option<Command> {
    match commands {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
