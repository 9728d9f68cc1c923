//! Credentials attached to outgoing API requests.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

/// How a client identifies itself to the API.
///
/// A user access token (obtained through one of the flows in [`crate::oauth`]) is sent as a
/// bearer token. Application-level calls, such as the WebHook endpoints, authenticate with
/// the app's client id and secret instead.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Authorization {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `Authorization: Basic base64(<client_id>:<client_secret>)`
    Basic {
        client_id: String,
        client_secret: String,
    },
    /// No `Authorization` header at all.
    #[default]
    None,
}

impl Authorization {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    pub fn basic(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::Basic {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// The value of the `Authorization` header for this credential, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Bearer(token) => Some(format!("Bearer {token}")),
            Self::Basic {
                client_id,
                client_secret,
            } => {
                let encoded = STANDARD.encode(format!("{client_id}:{client_secret}"));
                Some(format!("Basic {encoded}"))
            }
            Self::None => None,
        }
    }
}

// never print secrets
impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Bearer(..)"),
            Self::Basic { client_id, .. } => f
                .debug_struct("Basic")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            Self::None => f.write_str("None"),
        }
    }
}
