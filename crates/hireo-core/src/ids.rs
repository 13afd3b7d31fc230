use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Locally generated identifier with a readable prefix.
macro_rules! branded_id {
    ($name:ident, $prefix:expr) => {
        #[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(format!("{}_{}", $prefix, Uuid::now_v7()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

/// Server-assigned identifier. The server sends database integers, other
/// producers send strings; either is accepted and echoed back unchanged.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum Opaque {
    Number(i64),
    Text(String),
}

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Opaque);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match &self.0 {
                    Opaque::Number(n) => write!(f, "{n}"),
                    Opaque::Text(s) => f.write_str(s),
                }
            }
        }

        impl From<i64> for $name {
            fn from(n: i64) -> Self {
                Self(Opaque::Number(n))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(Opaque::Text(s.to_owned()))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(Opaque::Text(s))
            }
        }

        /// Bare digits parse as numbers so ids typed on a command line match
        /// the integer ids pushed by the server.
        impl FromStr for $name {
            type Err = std::convert::Infallible;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s.parse::<i64>() {
                    Ok(n) => Self::from(n),
                    Err(_) => Self::from(s),
                })
            }
        }
    };
}

branded_id!(ToastId, "toast");
opaque_id!(NotificationId);
opaque_id!(RelatedId);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn toast_id_has_prefix() {
        let id = ToastId::new();
        assert!(id.as_str().starts_with("toast_"), "got: {id}");
    }

    #[test]
    fn toast_ids_are_unique() {
        assert_ne!(ToastId::new(), ToastId::new());
    }

    #[test]
    fn notification_id_accepts_integer() {
        let id: NotificationId = serde_json::from_str("42").unwrap();
        assert_eq!(id, NotificationId::from(42));
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }

    #[test]
    fn notification_id_accepts_string() {
        let id: NotificationId = serde_json::from_str("\"n1\"").unwrap();
        assert_eq!(id, NotificationId::from("n1"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"n1\"");
    }

    #[test]
    fn numeric_string_stays_text_on_the_wire() {
        let id: NotificationId = serde_json::from_str("\"7\"").unwrap();
        assert_ne!(id, NotificationId::from(7));
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn from_str_prefers_numbers() {
        let id: NotificationId = "17".parse().unwrap();
        assert_eq!(id, NotificationId::from(17));
        let id: NotificationId = "n17".parse().unwrap();
        assert_eq!(id, NotificationId::from("n17"));
    }

    #[test]
    fn rejects_non_scalar() {
        assert!(serde_json::from_str::<NotificationId>("{\"id\":1}").is_err());
        assert!(serde_json::from_str::<RelatedId>("null").is_err());
    }

    proptest! {
        #[test]
        fn integer_ids_echo_as_numbers(n in any::<i64>()) {
            let id: NotificationId = serde_json::from_str(&n.to_string()).unwrap();
            prop_assert_eq!(&id, &NotificationId::from(n));
            prop_assert_eq!(serde_json::to_string(&id).unwrap(), n.to_string());
            prop_assert_eq!(id.to_string().parse::<NotificationId>().unwrap(), id);
        }

        #[test]
        fn string_ids_echo_as_strings(raw in "[A-Za-z0-9_-]{1,32}") {
            let json = serde_json::to_string(&raw).unwrap();
            let id: NotificationId = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(serde_json::to_string(&id).unwrap(), json);
            prop_assert_eq!(id.to_string(), raw);
        }
    }
}
