/// Failures of the push channel. Every variant is handled the same way by the
/// client (disconnect, then maybe reconnect); the split exists for logs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid channel url: {0}")]
    InvalidUrl(String),
    #[error("connect failed: {0}")]
    ConnectFailed(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("channel closed")]
    Closed,
}

impl ChannelError {
    /// Short classification string for logging/metrics.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::ConnectFailed(_) => "connect_failed",
            Self::Transport(_) => "transport",
            Self::Closed => "closed",
        }
    }
}

/// Inbound frame that could not be turned into a message.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not JSON: {0}")]
    NotJson(#[source] serde_json::Error),
    #[error("payload has no string `type` field")]
    MissingType,
    #[error("invalid `{kind}` payload: {reason}")]
    InvalidPayload { kind: String, reason: String },
}

impl DecodeError {
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::NotJson(_) => "not_json",
            Self::MissingType => "missing_type",
            Self::InvalidPayload { .. } => "invalid_payload",
        }
    }
}

/// Failure of a best-effort surface (sound, OS notification). Never escalated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("{0} not available")]
    Unavailable(&'static str),
    #[error("render failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_error_kinds() {
        assert_eq!(ChannelError::InvalidUrl("x".into()).error_kind(), "invalid_url");
        assert_eq!(ChannelError::ConnectFailed("refused".into()).error_kind(), "connect_failed");
        assert_eq!(ChannelError::Transport("reset".into()).error_kind(), "transport");
        assert_eq!(ChannelError::Closed.error_kind(), "closed");
    }

    #[test]
    fn channel_error_display() {
        let err = ChannelError::ConnectFailed("connection refused".into());
        assert_eq!(err.to_string(), "connect failed: connection refused");
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::InvalidPayload {
            kind: "notification_count".into(),
            reason: "missing field `count`".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid `notification_count` payload: missing field `count`"
        );
        assert_eq!(err.error_kind(), "invalid_payload");
    }

    #[test]
    fn render_error_display() {
        assert_eq!(
            RenderError::Unavailable("os notifications").to_string(),
            "os notifications not available"
        );
        assert_eq!(
            RenderError::Failed("stdout closed".into()).to_string(),
            "render failed: stdout closed"
        );
    }
}
