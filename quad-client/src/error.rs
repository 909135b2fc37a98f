//! Error taxonomy for the binding layer.

use thiserror::Error;

/// Failures a screen can observe from the binding layer.
///
/// Cloneable because the query cache stores the error in the entry and every
/// joiner of a deduplicated fetch receives its own copy; `reqwest` errors are
/// therefore flattened to strings at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never reached the server or timed out.
    #[error("network error: {0}")]
    Network(String),
    /// A non-2xx response, with status code and body verbatim.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// The response body was not the JSON we expected.
    #[error("decode error: {0}")]
    Decode(String),
    /// A mutation on this handle is already in flight; the call was rejected
    /// without issuing a request.
    #[error("a mutation is already in flight")]
    MutationPending,
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ClientError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}
