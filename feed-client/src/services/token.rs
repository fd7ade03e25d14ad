//! Authorization code exchange.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use photofeed_core::{Admission, GatePolicy, RequestGate, Ticket};
use photofeed_types::{AccessToken, AuthCode, OAuthTokenResponse};

use crate::config::Endpoints;
use crate::credentials::CredentialStore;
use crate::error::NetworkError;
use crate::http::HttpEnvelope;
use crate::task::{cancelled, join, TaskSlot};
use crate::transport::HttpRequest;

/// Exchanges authorization codes for bearer tokens and persists them.
///
/// Each code is sent at most once while it is the latest one submitted: a
/// repeated call with the same code is dropped, a call with a different code
/// cancels the exchange in flight.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<TokenInner>,
}

struct TokenInner {
    http: HttpEnvelope,
    endpoints: Endpoints,
    credentials: Arc<dyn CredentialStore>,
    state: Mutex<TokenState>,
}

struct TokenState {
    gate: RequestGate<AuthCode>,
    last_code: Option<AuthCode>,
    task: TaskSlot,
}

impl TokenService {
    /// Create the service.
    pub fn new(
        http: HttpEnvelope,
        endpoints: Endpoints,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                http,
                endpoints,
                credentials,
                state: Mutex::new(TokenState {
                    gate: RequestGate::new(GatePolicy::SkipSameKey),
                    last_code: None,
                    task: TaskSlot::default(),
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exchange `code` for a token and store it.
    ///
    /// Returns `Ok(None)` without sending anything if `code` is the code most
    /// recently submitted (in flight, or already exchanged successfully).
    pub async fn exchange(&self, code: AuthCode) -> Result<Option<AccessToken>, NetworkError> {
        let handle = {
            let mut state = self.lock();
            if state.last_code.as_ref() == Some(&code) {
                tracing::debug!("Ignoring repeated exchange of code {:?}", code);
                return Ok(None);
            }
            let ticket = match state.gate.admit(code.clone()) {
                Admission::Skip => return Ok(None),
                Admission::Start { ticket, superseded } => {
                    if let Some(old) = superseded {
                        tracing::debug!("Code exchange {} superseded", old.value());
                    }
                    ticket
                }
            };
            state.last_code = Some(code.clone());

            let this = self.clone();
            let handle = tokio::spawn(async move { this.run_exchange(ticket, code).await });
            state.task.replace(handle.abort_handle());
            handle
        };
        join(handle).await.map(Some)
    }

    async fn run_exchange(&self, ticket: Ticket, code: AuthCode) -> Result<AccessToken, NetworkError> {
        let result = self.request_token(&code).await;

        let mut state = self.lock();
        if !state.gate.complete(ticket) {
            return Err(cancelled());
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Token exchange failed: {}", e);
                state.last_code = None;
                return Err(e);
            }
        };

        if let Err(e) = self.inner.credentials.set_token(&response.access_token) {
            tracing::warn!("Failed to store access token: {}", e);
            state.last_code = None;
            return Err(NetworkError::CredentialStore(e.to_string()));
        }

        tracing::info!("Signed in ({} token, scope: {})", response.token_type, response.scope);
        Ok(response.access_token)
    }

    async fn request_token(&self, code: &AuthCode) -> Result<OAuthTokenResponse, NetworkError> {
        let url = self.inner.endpoints.token_url(code)?;
        self.inner.http.execute_decoded(HttpRequest::post(url)).await
    }

    /// Whether an exchange is in flight.
    pub fn is_exchanging(&self) -> bool {
        self.lock().gate.is_busy()
    }

    /// Cancel any exchange and forget the last code.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.gate.cancel();
        state.task.abort();
        state.last_code = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::credentials::MemoryCredentialStore;
    use crate::transport::{Method, MockTransport, TransportError};
    use serde_json::json;

    fn setup() -> (MockTransport, Arc<MemoryCredentialStore>, TokenService) {
        let transport = MockTransport::new();
        let store = Arc::new(MemoryCredentialStore::new());
        let endpoints = Endpoints::new(ClientConfig::new("key", "secret")).unwrap();
        let service = TokenService::new(
            HttpEnvelope::new(Arc::new(transport.clone())),
            endpoints,
            store.clone(),
        );
        (transport, store, service)
    }

    fn token_json(token: &str) -> serde_json::Value {
        json!({
            "access_token": token,
            "token_type": "Bearer",
            "scope": "public read_user write_likes",
            "created_at": 1_700_000_000
        })
    }

    // ===========================================
    // Exchange
    // ===========================================

    #[tokio::test]
    async fn exchange_posts_code_and_persists_token() {
        let (transport, store, service) = setup();
        transport.queue_json(200, &token_json("tok-1"));

        let token = service.exchange(AuthCode::new("codeA")).await.unwrap();
        assert_eq!(token.unwrap().as_str(), "tok-1");

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url.path(), "/oauth/token");
        assert_eq!(request.query_param("code").as_deref(), Some("codeA"));
        assert_eq!(request.query_param("client_id").as_deref(), Some("key"));
        assert_eq!(request.query_param("client_secret").as_deref(), Some("secret"));
        assert_eq!(
            request.query_param("grant_type").as_deref(),
            Some("authorization_code")
        );

        assert_eq!(store.token().unwrap().as_str(), "tok-1");
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_code_sends_one_request() {
        let (transport, store, service) = setup();
        transport.queue_json(200, &token_json("tok-1"));
        transport.pause();

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.exchange(AuthCode::new("codeA")).await })
        };
        assert!(transport.wait_for_requests(1).await);
        assert!(service.is_exchanging());

        let second = service.exchange(AuthCode::new("codeA")).await.unwrap();
        assert!(second.is_none());

        transport.resume();
        assert!(first.await.unwrap().unwrap().is_some());
        assert_eq!(transport.request_count(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn same_code_after_success_is_ignored() {
        let (transport, _store, service) = setup();
        transport.queue_json(200, &token_json("tok-1"));

        service.exchange(AuthCode::new("codeA")).await.unwrap();
        let again = service.exchange(AuthCode::new("codeA")).await.unwrap();

        assert!(again.is_none());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn different_code_supersedes_in_flight_exchange() {
        let (transport, store, service) = setup();
        transport.queue_json(200, &token_json("tok-A"));
        transport.queue_json(200, &token_json("tok-B"));
        transport.pause();

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.exchange(AuthCode::new("codeA")).await })
        };
        assert!(transport.wait_for_requests(1).await);

        let second = {
            let service = service.clone();
            tokio::spawn(async move { service.exchange(AuthCode::new("codeB")).await })
        };
        assert!(transport.wait_for_requests(2).await);
        transport.resume();

        assert!(first.await.unwrap().unwrap_err().is_cancelled());
        assert_eq!(second.await.unwrap().unwrap().unwrap().as_str(), "tok-B");
        assert_eq!(store.token().unwrap().as_str(), "tok-B");
        assert_eq!(store.write_count(), 1);
    }

    // ===========================================
    // Failure Paths
    // ===========================================

    #[tokio::test]
    async fn failure_allows_retry_with_same_code() {
        let (transport, store, service) = setup();
        transport.queue_error(TransportError::ConnectionFailed("offline".into()));
        transport.queue_json(200, &token_json("tok-1"));

        let result = service.exchange(AuthCode::new("codeA")).await;
        assert!(matches!(result, Err(NetworkError::Transport(_))));
        assert!(store.token().is_none());

        let retry = service.exchange(AuthCode::new("codeA")).await.unwrap();
        assert!(retry.is_some());
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn http_error_is_returned_typed() {
        let (transport, store, service) = setup();
        transport.queue_json(400, &json!({"error": "invalid_grant"}));

        let result = service.exchange(AuthCode::new("codeA")).await;
        assert!(matches!(result, Err(NetworkError::HttpStatus(400))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let (transport, store, service) = setup();
        transport.queue_json(200, &token_json("tok-1"));
        store.fail_next_write("keychain locked");

        let result = service.exchange(AuthCode::new("codeA")).await;
        assert!(matches!(result, Err(NetworkError::CredentialStore(_))));
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn reset_forgets_last_code() {
        let (transport, _store, service) = setup();
        transport.queue_json(200, &token_json("tok-1"));
        transport.queue_json(200, &token_json("tok-2"));

        service.exchange(AuthCode::new("codeA")).await.unwrap();
        service.reset();
        service.reset();

        let again = service.exchange(AuthCode::new("codeA")).await.unwrap();
        assert_eq!(again.unwrap().as_str(), "tok-2");
    }
}
