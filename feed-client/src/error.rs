//! Error type returned by every service operation.

use crate::transport::TransportError;
use thiserror::Error;

/// Failure of a network-backed operation.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Nothing usable came back (DNS, TLS, timeout, cancellation).
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// The reply was not a well-formed HTTP response.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server answered outside `200..=299`.
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// A body was required but the response had none.
    #[error("response body is empty")]
    EmptyBody,

    /// The body was not the expected JSON.
    #[error("failed to decode response: {source}")]
    Decoding {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// The raw body, lossily decoded as UTF-8.
        body: String,
    },

    /// No credential is stored.
    #[error("not authenticated")]
    Unauthenticated,

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The credential store could not be written.
    #[error("credential store error: {0}")]
    CredentialStore(String),
}

impl NetworkError {
    /// Whether the caller should send the user back to sign-in.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::HttpStatus(401))
    }

    /// Whether the request was cancelled because it was superseded or reset.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }

    /// Raw body of a response that failed to decode.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::Decoding { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<TransportError> for NetworkError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Malformed(reason) => Self::Protocol(reason),
            other => Self::Transport(other),
        }
    }
}
