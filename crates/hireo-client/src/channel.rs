//! Push-channel transport. [`WsConnector`] is the WebSocket implementation;
//! tests plug in scripted connectors through the same traits.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use hireo_core::ChannelError;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, COOKIE};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Something read from an open channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelEvent {
    Text(String),
    /// Orderly close, with the peer's reason if it gave one.
    Closed(Option<String>),
}

/// An open push channel. Owned by exactly one client.
#[async_trait]
pub trait Channel: Send {
    /// Wait for the next text frame or the end of the connection.
    async fn recv(&mut self) -> Result<ChannelEvent, ChannelError>;

    async fn send(&mut self, text: String) -> Result<(), ChannelError>;
}

/// Opens channels. One call per connection attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Channel>, ChannelError>;
}

/// WebSocket connector over `tokio-tungstenite`.
#[derive(Clone, Debug, Default)]
pub struct WsConnector {
    cookie: Option<String>,
}

impl WsConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a `Cookie` header with the handshake, for cookie-authenticated
    /// endpoints.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Channel>, ChannelError> {
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| ChannelError::InvalidUrl(e.to_string()))?;
        if let Some(cookie) = &self.cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ChannelError::ConnectFailed(format!("invalid cookie header: {e}")))?;
            let _ = request.headers_mut().insert(COOKIE, value);
        }

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| ChannelError::ConnectFailed(e.to_string()))?;
        Ok(Box::new(WsChannel { stream }))
    }
}

struct WsChannel {
    stream: WsStream,
}

#[async_trait]
impl Channel for WsChannel {
    async fn recv(&mut self) -> Result<ChannelEvent, ChannelError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(ChannelEvent::Text(text.to_string())),
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.to_string())
                        .filter(|r| !r.is_empty());
                    return Ok(ChannelEvent::Closed(reason));
                }
                // Pings are answered by tungstenite; binary frames are not part of the protocol.
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(transport_error(e)),
                None => return Ok(ChannelEvent::Closed(None)),
            }
        }
    }

    async fn send(&mut self, text: String) -> Result<(), ChannelError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(transport_error)
    }
}

fn transport_error(e: WsError) -> ChannelError {
    match e {
        WsError::ConnectionClosed | WsError::AlreadyClosed => ChannelError::Closed,
        other => ChannelError::Transport(other.to_string()),
    }
}
