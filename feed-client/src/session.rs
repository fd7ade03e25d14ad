//! Session wiring.
//!
//! [`Session`] builds the four services around one transport, one credential
//! store and one event bus, and runs the flows that span services: sign-in
//! (exchange, then profile, then avatar), restoring a stored session, and
//! logout.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use photofeed_client::{ClientConfig, FileCredentialStore, Session};
//! use photofeed_types::AuthCode;
//!
//! let config = ClientConfig::new("access-key", "secret-key");
//! let store = Arc::new(FileCredentialStore::new("credentials.json"));
//! let session = Session::with_reqwest(config, store)?;
//!
//! println!("Open {}", session.authorize_url()?);
//! let profile = session.sign_in(AuthCode::new("code-from-redirect")).await?;
//! session.feed().fetch_next_page().await?;
//! ```

use std::sync::Arc;

use photofeed_core::SessionEvent;
use photofeed_types::{AccessToken, AuthCode, Profile};
use tokio::sync::broadcast;
use url::Url;

use crate::config::{ClientConfig, Endpoints};
use crate::credentials::CredentialStore;
use crate::error::NetworkError;
use crate::events::EventBus;
use crate::http::HttpEnvelope;
use crate::services::{AvatarService, FeedService, ProfileService, TokenService};
use crate::transport::{HttpTransport, ReqwestTransport};

/// All services of one signed-in (or signing-in) user.
#[derive(Clone)]
pub struct Session {
    endpoints: Endpoints,
    credentials: Arc<dyn CredentialStore>,
    events: EventBus,
    tokens: TokenService,
    profile: ProfileService,
    avatar: AvatarService,
    feed: FeedService,
}

impl Session {
    /// Build a session on `transport`.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, NetworkError> {
        let endpoints = Endpoints::new(config)?;
        let http = HttpEnvelope::new(transport);
        let events = EventBus::new();

        Ok(Self {
            tokens: TokenService::new(http.clone(), endpoints.clone(), credentials.clone()),
            profile: ProfileService::new(http.clone(), endpoints.clone()),
            avatar: AvatarService::new(
                http.clone(),
                endpoints.clone(),
                credentials.clone(),
                events.clone(),
            ),
            feed: FeedService::new(http, endpoints.clone(), credentials.clone(), events.clone()),
            endpoints,
            credentials,
            events,
        })
    }

    /// Build a session on a [`ReqwestTransport`] using the configured timeout.
    pub fn with_reqwest(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, NetworkError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::new(config, Arc::new(transport), credentials)
    }

    /// Token exchange service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Profile service.
    pub fn profile(&self) -> &ProfileService {
        &self.profile
    }

    /// Avatar service.
    pub fn avatar(&self) -> &AvatarService {
        &self.avatar
    }

    /// Feed service.
    pub fn feed(&self) -> &FeedService {
        &self.feed
    }

    /// Event bus shared by the services.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Page where the user grants access and receives a code.
    pub fn authorize_url(&self) -> Result<Url, NetworkError> {
        self.endpoints.authorize_url()
    }

    /// Whether a token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.token().is_some()
    }

    /// Exchange `code`, then load the profile and avatar.
    ///
    /// Returns `Ok(None)` if `code` was a duplicate and nothing was sent, or if
    /// the profile was already being loaded by another caller.
    /// An avatar failure is logged and does not fail sign-in.
    pub async fn sign_in(&self, code: AuthCode) -> Result<Option<Profile>, NetworkError> {
        let Some(token) = self.tokens.exchange(code).await? else {
            return Ok(None);
        };
        self.load_account(&token).await
    }

    /// Resume from the stored token by loading the profile and avatar.
    ///
    /// Returns `Ok(None)` if another caller is already loading the profile;
    /// that caller loads the avatar too.
    pub async fn restore(&self) -> Result<Option<Profile>, NetworkError> {
        let token = self.credentials.token().ok_or(NetworkError::Unauthenticated)?;
        self.load_account(&token).await
    }

    async fn load_account(&self, token: &AccessToken) -> Result<Option<Profile>, NetworkError> {
        let Some(profile) = self.profile.fetch_profile(token).await? else {
            tracing::debug!("Profile already loading, leaving the account to that caller");
            return Ok(None);
        };

        if let Err(e) = self.avatar.fetch_avatar_url(&profile.username).await {
            tracing::warn!("Avatar unavailable for {}: {}", profile.login_handle, e);
        }
        Ok(Some(profile))
    }

    /// Sign out: drop the stored token, reset every service and publish
    /// [`SessionEvent::SessionEnded`].
    ///
    /// Best effort: a store failure is logged and teardown continues. Safe to
    /// call on a session that never loaded anything.
    pub fn logout(&self) {
        if let Err(e) = self.credentials.clear() {
            tracing::warn!("Failed to clear stored credentials: {}", e);
        }
        self.tokens.reset();
        self.profile.reset();
        self.avatar.reset();
        self.feed.reset();

        tracing::info!("Logged out");
        self.events.publish(SessionEvent::SessionEnded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::transport::MockTransport;
    use photofeed_types::PhotoId;
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;

    fn setup() -> (MockTransport, Arc<MemoryCredentialStore>, Session) {
        let transport = MockTransport::new();
        let store = Arc::new(MemoryCredentialStore::new());
        let session = Session::new(
            ClientConfig::new("key", "secret"),
            Arc::new(transport.clone()),
            store.clone(),
        )
        .unwrap();
        (transport, store, session)
    }

    fn queue_account(transport: &MockTransport) {
        transport.queue_json(200, &json!({"username": "jdoe", "first_name": "Jane", "last_name": "Doe"}));
        transport.queue_json(
            200,
            &json!({"profile_image": {"small": "https://img.example/s", "medium": "m", "large": "l"}}),
        );
    }

    fn queue_page(transport: &MockTransport) {
        let photos: Vec<serde_json::Value> = (1..=3)
            .map(|i| {
                json!({
                    "id": i.to_string(),
                    "width": 10,
                    "height": 10,
                    "urls": {"raw": "r", "full": "f", "regular": "g", "small": "s", "thumb": "t"}
                })
            })
            .collect();
        transport.queue_json(200, &serde_json::Value::Array(photos));
    }

    // ===========================================
    // Sign-in
    // ===========================================

    #[tokio::test]
    async fn sign_in_runs_exchange_profile_avatar() {
        let (transport, store, session) = setup();
        let mut rx = session.subscribe();
        transport.queue_json(200, &json!({"access_token": "tok", "token_type": "Bearer", "scope": "public"}));
        queue_account(&transport);

        assert!(!session.is_authenticated());
        let profile = session.sign_in(AuthCode::new("codeA")).await.unwrap().unwrap();

        assert_eq!(profile.display_name, "Jane Doe");
        assert!(session.is_authenticated());
        assert_eq!(store.token().unwrap().as_str(), "tok");
        assert_eq!(session.avatar().avatar_url().as_deref(), Some("https://img.example/s"));

        let paths: Vec<String> = transport
            .sent_requests()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect();
        assert_eq!(paths, vec!["/oauth/token", "/me", "/users/jdoe"]);
        assert!(matches!(rx.try_recv(), Ok(SessionEvent::AvatarChanged { .. })));
    }

    #[tokio::test]
    async fn sign_in_survives_avatar_failure() {
        let (transport, _store, session) = setup();
        transport.queue_json(200, &json!({"access_token": "tok", "token_type": "Bearer", "scope": "public"}));
        transport.queue_json(200, &json!({"username": "jdoe", "first_name": "Jane"}));
        transport.queue_status(503);

        let profile = session.sign_in(AuthCode::new("codeA")).await.unwrap();
        assert_eq!(profile.unwrap().username, "jdoe");
        assert!(session.avatar().avatar_url().is_none());
    }

    #[tokio::test]
    async fn failed_exchange_stops_sign_in() {
        let (transport, _store, session) = setup();
        transport.queue_status(401);

        let result = session.sign_in(AuthCode::new("codeA")).await;
        assert!(result.unwrap_err().is_unauthorized());
        assert_eq!(transport.request_count(), 1);
        assert!(session.profile().profile().is_none());
    }

    #[tokio::test]
    async fn restore_uses_stored_token() {
        let (transport, store, session) = setup();
        store.set_token(&AccessToken::new("stored")).unwrap();
        queue_account(&transport);

        let profile = session.restore().await.unwrap().unwrap();
        assert_eq!(profile.login_handle, "@jdoe");
        assert_eq!(
            transport.sent_requests()[0].header("Authorization"),
            Some("Bearer stored")
        );
    }

    #[tokio::test]
    async fn overlapping_restores_load_the_account_once() {
        let (transport, store, session) = setup();
        store.set_token(&AccessToken::new("stored")).unwrap();
        queue_account(&transport);
        transport.pause();

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.restore().await })
        };
        assert!(transport.wait_for_requests(1).await);

        // Profile is still loading and nothing is cached yet
        assert_eq!(session.restore().await.unwrap(), None);

        transport.resume();
        let profile = first.await.unwrap().unwrap().unwrap();
        assert_eq!(profile.username, "jdoe");
        assert_eq!(session.avatar().avatar_url().as_deref(), Some("https://img.example/s"));

        let paths: Vec<String> = transport
            .sent_requests()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect();
        assert_eq!(paths, vec!["/me", "/users/jdoe"]);
    }

    #[tokio::test]
    async fn restore_without_token_is_unauthenticated() {
        let (transport, _store, session) = setup();
        assert!(matches!(
            session.restore().await,
            Err(NetworkError::Unauthenticated)
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn authorize_url_points_at_auth_host() {
        let (_transport, _store, session) = setup();
        let url = session.authorize_url().unwrap();
        assert_eq!(url.path(), "/oauth/authorize");
    }

    // ===========================================
    // Logout
    // ===========================================

    #[tokio::test]
    async fn logout_clears_everything_and_signals_once() {
        let (transport, store, session) = setup();
        store.set_token(&AccessToken::new("tok")).unwrap();
        queue_account(&transport);
        session.restore().await.unwrap();
        queue_page(&transport);
        session.feed().fetch_next_page().await.unwrap();

        let mut rx = session.subscribe();
        session.logout();

        assert!(!session.is_authenticated());
        assert!(session.profile().profile().is_none());
        assert!(session.avatar().avatar_url().is_none());
        assert!(session.feed().is_empty());
        assert_eq!(session.feed().next_page(), 1);
        assert_eq!(rx.try_recv(), Ok(SessionEvent::SessionEnded));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn logout_on_fresh_session_is_safe() {
        let (_transport, _store, session) = setup();
        let mut rx = session.subscribe();

        session.logout();
        assert_eq!(rx.try_recv(), Ok(SessionEvent::SessionEnded));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn like_after_logout_is_unauthenticated() {
        let (_transport, store, session) = setup();
        store.set_token(&AccessToken::new("tok")).unwrap();
        session.logout();

        let result = session.feed().set_liked(PhotoId::new("1"), true).await;
        assert!(matches!(result, Err(NetworkError::Unauthenticated)));
    }
}
