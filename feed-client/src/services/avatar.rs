//! Avatar URL lookup.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use photofeed_core::{Admission, GatePolicy, RequestGate, SessionEvent, Ticket};
use photofeed_types::{AccessToken, UserResult};

use crate::config::Endpoints;
use crate::credentials::CredentialStore;
use crate::error::NetworkError;
use crate::events::EventBus;
use crate::http::HttpEnvelope;
use crate::task::{cancelled, join, TaskSlot};
use crate::transport::HttpRequest;

/// Fetches the user's avatar URL, de-duplicated by username.
///
/// A call for the username already in flight is dropped. A call for a
/// different username cancels the stale request.
#[derive(Clone)]
pub struct AvatarService {
    inner: Arc<AvatarInner>,
}

struct AvatarInner {
    http: HttpEnvelope,
    endpoints: Endpoints,
    credentials: Arc<dyn CredentialStore>,
    events: EventBus,
    state: Mutex<AvatarState>,
}

struct AvatarState {
    gate: RequestGate<String>,
    task: TaskSlot,
    avatar_url: Option<String>,
}

impl AvatarService {
    /// Create the service with an empty cache.
    pub fn new(
        http: HttpEnvelope,
        endpoints: Endpoints,
        credentials: Arc<dyn CredentialStore>,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(AvatarInner {
                http,
                endpoints,
                credentials,
                events,
                state: Mutex::new(AvatarState {
                    gate: RequestGate::new(GatePolicy::SkipSameKey),
                    task: TaskSlot::default(),
                    avatar_url: None,
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AvatarState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the avatar URL of `username`, cache it and publish
    /// [`SessionEvent::AvatarChanged`].
    ///
    /// Returns `Ok(None)` if a request for the same username is in flight.
    pub async fn fetch_avatar_url(&self, username: &str) -> Result<Option<String>, NetworkError> {
        let token = self
            .inner
            .credentials
            .token()
            .ok_or(NetworkError::Unauthenticated)?;

        let handle = {
            let mut state = self.lock();
            let ticket = match state.gate.admit(username.to_string()) {
                Admission::Skip => {
                    tracing::debug!("Avatar fetch for {} already in flight", username);
                    return Ok(None);
                }
                Admission::Start { ticket, superseded } => {
                    if superseded.is_some() {
                        tracing::debug!("Cancelling stale avatar fetch");
                    }
                    ticket
                }
            };

            let this = self.clone();
            let username = username.to_string();
            let handle = tokio::spawn(async move { this.run_fetch(ticket, username, token).await });
            state.task.replace(handle.abort_handle());
            handle
        };
        join(handle).await.map(Some)
    }

    async fn run_fetch(
        &self,
        ticket: Ticket,
        username: String,
        token: AccessToken,
    ) -> Result<String, NetworkError> {
        let result = self.request_avatar(&username, &token).await;

        let url = {
            let mut state = self.lock();
            if !state.gate.complete(ticket) {
                return Err(cancelled());
            }
            match result {
                Ok(url) => {
                    state.avatar_url = Some(url.clone());
                    url
                }
                Err(e) => {
                    tracing::warn!("Avatar fetch for {} failed: {}", username, e);
                    return Err(e);
                }
            }
        };

        self.inner
            .events
            .publish(SessionEvent::AvatarChanged { url: url.clone() });
        Ok(url)
    }

    async fn request_avatar(&self, username: &str, token: &AccessToken) -> Result<String, NetworkError> {
        let request = HttpRequest::get(self.inner.endpoints.user_url(username)?)
            .with_header("Authorization", token.bearer_header());
        let user: UserResult = self.inner.http.execute_decoded(request).await?;
        let size = self.inner.endpoints.config().avatar_size;
        Ok(size.pick(&user.profile_image).to_string())
    }

    /// The cached avatar URL.
    pub fn avatar_url(&self) -> Option<String> {
        self.lock().avatar_url.clone()
    }

    /// Cancel any fetch and drop the cache.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.gate.cancel();
        state.task.abort();
        state.avatar_url = None;
    }
}
