//! HTTP envelope: one round-trip, one typed result.
//!
//! Every service request goes through [`HttpEnvelope`], which turns
//! transport failures, non-2xx statuses, missing bodies and bad JSON into the
//! matching [`NetworkError`] variant. The envelope never touches service
//! state; it only returns to the awaiting caller.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::NetworkError;
use crate::transport::{HttpRequest, HttpTransport};

/// Wraps a transport and normalizes its results.
#[derive(Clone)]
pub struct HttpEnvelope {
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for HttpEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpEnvelope").finish_non_exhaustive()
    }
}

impl HttpEnvelope {
    /// Wrap `transport`.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Perform `request` and return the body of a 2xx response.
    ///
    /// An empty body is an error here; use
    /// [`execute_discarding_body`](Self::execute_discarding_body) for
    /// endpoints whose body is irrelevant.
    pub async fn execute(&self, request: HttpRequest) -> Result<Vec<u8>, NetworkError> {
        let body = self.round_trip(request).await?;
        if body.is_empty() {
            return Err(NetworkError::EmptyBody);
        }
        Ok(body)
    }

    /// Perform `request` and decode the JSON body as `T`.
    pub async fn execute_decoded<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<T, NetworkError> {
        let body = self.execute(request).await?;
        decode(&body)
    }

    /// Perform `request`, succeeding on any 2xx response.
    pub async fn execute_discarding_body(&self, request: HttpRequest) -> Result<(), NetworkError> {
        self.round_trip(request).await.map(|_| ())
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<Vec<u8>, NetworkError> {
        let method = request.method;
        let path = request.url.path().to_string();
        tracing::debug!("{} {}", method, path);

        let response = self.transport.execute(request).await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, path, e);
            NetworkError::from(e)
        })?;

        if !response.is_success() {
            tracing::warn!("{} {} returned HTTP {}", method, path, response.status);
            return Err(NetworkError::HttpStatus(response.status));
        }

        tracing::debug!(
            "{} {} -> {} ({} bytes)",
            method,
            path,
            response.status,
            response.body.len()
        );
        Ok(response.body)
    }
}

/// Decode a JSON body, keeping the raw text on failure.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, NetworkError> {
    serde_json::from_slice(body).map_err(|source| {
        let body = String::from_utf8_lossy(body).into_owned();
        tracing::warn!("Failed to decode response: {} (body: {} bytes)", source, body.len());
        NetworkError::Decoding { source, body }
    })
}
