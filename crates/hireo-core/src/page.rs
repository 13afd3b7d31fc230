use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ChannelError;

/// Identity of the signed-in user, as exposed by the page host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Whether OS-level notifications were granted before the client started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
    #[default]
    Default,
}

/// What the hosting page provides to the client at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageContext {
    /// Origin the page was loaded from, e.g. `https://jobs.example.com`.
    pub origin: String,
    pub user: Option<UserIdentity>,
    /// Title without the unread prefix.
    pub title: String,
    pub notification_permission: Permission,
}

impl PageContext {
    pub fn new(origin: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            user: None,
            title: title.into(),
            notification_permission: Permission::Default,
        }
    }

    pub fn with_user(mut self, user: UserIdentity) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.notification_permission = permission;
        self
    }

    /// The signed-in user, if the page exposes a usable one.
    pub fn current_user(&self) -> Option<&UserIdentity> {
        self.user.as_ref().filter(|u| u.is_valid())
    }
}

/// Derive the push-channel endpoint from the page origin: `http` becomes
/// `ws`, `https` becomes `wss`, and the path is replaced by `path`.
pub fn channel_url(origin: &str, path: &str) -> Result<Url, ChannelError> {
    let mut url = Url::parse(origin.trim())
        .map_err(|e| ChannelError::InvalidUrl(format!("{origin}: {e}")))?;

    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(ChannelError::InvalidUrl(format!(
                "unsupported origin scheme `{other}`"
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| ChannelError::InvalidUrl(format!("cannot use scheme `{scheme}`")))?;

    if path.starts_with('/') {
        url.set_path(path);
    } else {
        url.set_path(&format!("/{path}"));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_origin_becomes_ws() {
        let url = channel_url("http://localhost:8000", "/ws/notifications/").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/ws/notifications/");
    }

    #[test]
    fn secure_origin_becomes_wss() {
        let url = channel_url("https://jobs.example.com", "/ws/notifications/").unwrap();
        assert_eq!(url.as_str(), "wss://jobs.example.com/ws/notifications/");
    }

    #[test]
    fn page_path_and_query_are_replaced() {
        let url = channel_url("https://jobs.example.com/jobs/12/?q=rust#top", "ws/feed/").unwrap();
        assert_eq!(url.as_str(), "wss://jobs.example.com/ws/feed/");
    }

    #[test]
    fn malformed_origin_is_rejected() {
        let err = channel_url("not a url", "/ws/notifications/").unwrap_err();
        assert_eq!(err.error_kind(), "invalid_url");
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let err = channel_url("file:///tmp/index.html", "/ws/notifications/").unwrap_err();
        assert!(matches!(err, ChannelError::InvalidUrl(_)));
    }

    #[test]
    fn blank_user_is_not_a_user() {
        let page = PageContext::new("http://localhost", "Hireo").with_user(UserIdentity::new("  "));
        assert!(page.current_user().is_none());

        let page = PageContext::new("http://localhost", "Hireo").with_user(UserIdentity::new("42"));
        assert_eq!(page.current_user().map(|u| u.id.as_str()), Some("42"));
    }
}
