//! Error types shared by every TwitCasting API call.

use http::StatusCode;
use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong when talking to TwitCasting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API (or the connection to it) reported a failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A payload was handed to the parser with a kind tag that has no entity type.
    ///
    /// This is a wiring bug in the caller, never a problem with the data.
    #[error("no model for this payload type: {0}")]
    UnknownModelKind(String),

    /// A caller-supplied argument was rejected before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A successful response did not have the shape the endpoint promises.
    #[error("unexpected {context} payload: {reason}")]
    Payload { context: String, reason: String },

    /// A follow-up call was made on an entity whose client no longer exists.
    #[error("the client that produced this value has been dropped")]
    ClientDropped,

    /// An OAuth redirect or token exchange could not be completed.
    #[error("authorization failed: {0}")]
    Authorization(String),
}

impl Error {
    pub(crate) fn payload(context: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Payload {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// The classified API error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// A classified failure of a single API request.
///
/// Protocol-level errors carry the code the server put in its `error` object; failures that
/// never produced a usable error body (connection problems, empty or foreign bodies) carry
/// [`ApiError::TRANSPORT_CODE`].
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status of the final attempt. `None` if no response was received at all.
    pub status: Option<StatusCode>,
    /// Application-level error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Extra validation details, when the server sent any.
    pub details: Option<serde_json::Value>,
    /// The URL the failing request was sent to.
    pub url: String,
}

impl ApiError {
    /// Code used when the server did not supply one.
    pub const TRANSPORT_CODE: i64 = -1;

    pub(crate) fn transport(
        status: Option<StatusCode>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code: Self::TRANSPORT_CODE,
            message: message.into(),
            details: None,
            url: url.into(),
        }
    }

    /// Whether this error came from the server's own error object.
    pub fn is_protocol_error(&self) -> bool {
        self.code != Self::TRANSPORT_CODE
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "http status: {}", status.as_u16())?,
            None => write!(f, "http status: none")?,
        }
        write!(f, ", code: {} {}: {}", self.code, self.url, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " {details}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}
