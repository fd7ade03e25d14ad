//! Current user profile.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use photofeed_core::{Admission, GatePolicy, RequestGate, Ticket};
use photofeed_types::{AccessToken, Profile, ProfileResult};

use crate::config::Endpoints;
use crate::error::NetworkError;
use crate::http::HttpEnvelope;
use crate::task::{cancelled, join, TaskSlot};
use crate::transport::HttpRequest;

/// Fetches and caches the signed-in user's profile.
#[derive(Clone)]
pub struct ProfileService {
    inner: Arc<ProfileInner>,
}

struct ProfileInner {
    http: HttpEnvelope,
    endpoints: Endpoints,
    state: Mutex<ProfileState>,
}

struct ProfileState {
    gate: RequestGate<()>,
    task: TaskSlot,
    profile: Option<Profile>,
}

impl ProfileService {
    /// Create the service with an empty cache.
    pub fn new(http: HttpEnvelope, endpoints: Endpoints) -> Self {
        Self {
            inner: Arc::new(ProfileInner {
                http,
                endpoints,
                state: Mutex::new(ProfileState {
                    gate: RequestGate::new(GatePolicy::SkipWhileBusy),
                    task: TaskSlot::default(),
                    profile: None,
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProfileState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the profile for `token` and cache it.
    ///
    /// Returns `Ok(None)` if a fetch is already in flight. On failure the
    /// cached profile is left as it was.
    pub async fn fetch_profile(&self, token: &AccessToken) -> Result<Option<Profile>, NetworkError> {
        let handle = {
            let mut state = self.lock();
            let ticket = match state.gate.admit(()) {
                Admission::Skip => {
                    tracing::debug!("Profile fetch already in flight");
                    return Ok(None);
                }
                Admission::Start { ticket, .. } => ticket,
            };

            let this = self.clone();
            let token = token.clone();
            let handle = tokio::spawn(async move { this.run_fetch(ticket, token).await });
            state.task.replace(handle.abort_handle());
            handle
        };
        join(handle).await.map(Some)
    }

    async fn run_fetch(&self, ticket: Ticket, token: AccessToken) -> Result<Profile, NetworkError> {
        let result = self.request_profile(&token).await;

        let mut state = self.lock();
        if !state.gate.complete(ticket) {
            return Err(cancelled());
        }
        let profile = match result {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Profile fetch failed: {}", e);
                return Err(e);
            }
        };

        tracing::debug!("Loaded profile for {}", profile.login_handle);
        state.profile = Some(profile.clone());
        Ok(profile)
    }

    async fn request_profile(&self, token: &AccessToken) -> Result<Profile, NetworkError> {
        let request =
            HttpRequest::get(self.inner.endpoints.me_url()?).with_header("Authorization", token.bearer_header());
        let result: ProfileResult = self.inner.http.execute_decoded(request).await?;
        Ok(Profile::from(result))
    }

    /// The cached profile.
    pub fn profile(&self) -> Option<Profile> {
        self.lock().profile.clone()
    }

    /// Cancel any fetch and drop the cache.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.gate.cancel();
        state.task.abort();
        state.profile = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn setup() -> (MockTransport, ProfileService) {
        let transport = MockTransport::new();
        let endpoints = Endpoints::new(ClientConfig::new("key", "secret")).unwrap();
        let service = ProfileService::new(HttpEnvelope::new(Arc::new(transport.clone())), endpoints);
        (transport, service)
    }

    fn profile_json() -> serde_json::Value {
        json!({
            "username": "jdoe",
            "first_name": "Jane",
            "last_name": "Doe",
            "bio": "Landscapes"
        })
    }

    #[tokio::test]
    async fn fetch_sends_bearer_and_caches() {
        let (transport, service) = setup();
        transport.queue_json(200, &profile_json());

        let profile = service
            .fetch_profile(&AccessToken::new("tok"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(profile.display_name, "Jane Doe");
        assert_eq!(profile.login_handle, "@jdoe");
        assert_eq!(service.profile(), Some(profile));

        let request = transport.last_request().unwrap();
        assert_eq!(request.url.path(), "/me");
        assert_eq!(request.header("Authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn missing_last_name_is_tolerated() {
        let (transport, service) = setup();
        transport.queue_json(200, &json!({"username": "solo", "first_name": "Cher", "last_name": null}));

        let profile = service
            .fetch_profile(&AccessToken::new("tok"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.display_name, "Cher");
        assert_eq!(profile.bio, None);
    }

    #[tokio::test]
    async fn call_while_in_flight_is_skipped() {
        let (transport, service) = setup();
        transport.queue_json(200, &profile_json());
        transport.pause();

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.fetch_profile(&AccessToken::new("tok")).await })
        };
        assert!(transport.wait_for_requests(1).await);

        assert!(service
            .fetch_profile(&AccessToken::new("tok"))
            .await
            .unwrap()
            .is_none());

        transport.resume();
        assert!(first.await.unwrap().unwrap().is_some());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn failure_keeps_previous_cache() {
        let (transport, service) = setup();
        transport.queue_json(200, &profile_json());
        transport.queue_status(500);

        service.fetch_profile(&AccessToken::new("tok")).await.unwrap();
        let result = service.fetch_profile(&AccessToken::new("tok")).await;

        assert!(matches!(result, Err(NetworkError::HttpStatus(500))));
        assert_eq!(service.profile().unwrap().username, "jdoe");
    }

    #[tokio::test]
    async fn reset_clears_cache() {
        let (transport, service) = setup();
        transport.queue_json(200, &profile_json());
        service.fetch_profile(&AccessToken::new("tok")).await.unwrap();

        service.reset();
        service.reset();
        assert!(service.profile().is_none());
    }

    #[tokio::test]
    async fn reset_discards_in_flight_result() {
        let (transport, service) = setup();
        transport.queue_json(200, &profile_json());
        transport.pause();

        let pending = {
            let service = service.clone();
            tokio::spawn(async move { service.fetch_profile(&AccessToken::new("tok")).await })
        };
        assert!(transport.wait_for_requests(1).await);

        service.reset();
        transport.resume();

        assert!(pending.await.unwrap().unwrap_err().is_cancelled());
        assert!(service.profile().is_none());
    }
}
