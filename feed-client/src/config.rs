//! Client configuration and URL construction.
//!
//! [`ClientConfig`] holds the application credentials and hosts.
//! [`Endpoints`] turns it into concrete request URLs. Every URL goes through
//! [`url::Url`], so a bad base URL or path segment surfaces as
//! [`NetworkError::InvalidRequest`] instead of a malformed request.

use std::fmt;
use std::time::Duration;

use photofeed_core::DEFAULT_PER_PAGE;
use photofeed_types::{AuthCode, PhotoId, ProfileImage};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::NetworkError;

/// Default host for authorization and token exchange.
pub const DEFAULT_AUTH_BASE_URL: &str = "https://unsplash.com";
/// Default host for API calls.
pub const DEFAULT_API_BASE_URL: &str = "https://api.unsplash.com";
/// Redirect URI for installed apps without a callback server.
pub const DEFAULT_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
/// Scopes needed to read the profile and change likes.
pub const DEFAULT_SCOPE: &str = "public read_user write_likes";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which avatar rendition to cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarSize {
    /// Small rendition
    #[default]
    Small,
    /// Medium rendition
    Medium,
    /// Large rendition
    Large,
}

impl AvatarSize {
    /// The URL for this size.
    pub fn pick<'a>(&self, image: &'a ProfileImage) -> &'a str {
        match self {
            AvatarSize::Small => &image.small,
            AvatarSize::Medium => &image.medium,
            AvatarSize::Large => &image.large,
        }
    }
}

/// Configuration for the session services.
#[derive(Clone)]
pub struct ClientConfig {
    /// Application access key, sent as `client_id` and in `Client-ID` headers.
    pub access_key: String,
    /// Application secret, sent only during token exchange.
    pub secret_key: String,
    /// Redirect URI registered for the application.
    pub redirect_uri: String,
    /// Space separated OAuth scopes.
    pub scope: String,
    /// Base URL of the authorization host.
    pub auth_base_url: String,
    /// Base URL of the API host.
    pub api_base_url: String,
    /// Photos per feed page.
    pub per_page: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Avatar rendition to cache.
    pub avatar_size: AvatarSize,
}

impl ClientConfig {
    /// Create a configuration for the given application credentials.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            timeout: DEFAULT_TIMEOUT,
            avatar_size: AvatarSize::default(),
        }
    }

    /// Set the redirect URI.
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Set the OAuth scopes.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the authorization host.
    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = url.into();
        self
    }

    /// Set the API host.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the page size.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the avatar rendition.
    pub fn with_avatar_size(mut self, size: AvatarSize) -> Self {
        self.avatar_size = size;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("auth_base_url", &self.auth_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("per_page", &self.per_page)
            .field("timeout", &self.timeout)
            .field("avatar_size", &self.avatar_size)
            .finish()
    }
}

/// Builds request URLs from a [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct Endpoints {
    config: ClientConfig,
    auth_base: Url,
    api_base: Url,
}

impl Endpoints {
    /// Validate the base URLs of `config`.
    pub fn new(config: ClientConfig) -> Result<Self, NetworkError> {
        let auth_base = parse_base(&config.auth_base_url)?;
        let api_base = parse_base(&config.api_base_url)?;
        Ok(Self {
            config,
            auth_base,
            api_base,
        })
    }

    /// The configuration these endpoints were built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Page where the user grants access.
    pub fn authorize_url(&self) -> Result<Url, NetworkError> {
        let mut url = join(&self.auth_base, &["oauth", "authorize"])?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.access_key)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scope);
        Ok(url)
    }

    /// Token exchange for `code`. Parameters travel in the query string.
    pub fn token_url(&self, code: &AuthCode) -> Result<Url, NetworkError> {
        if code.as_str().is_empty() {
            return Err(NetworkError::InvalidRequest("empty authorization code".into()));
        }
        let mut url = join(&self.auth_base, &["oauth", "token"])?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.access_key)
            .append_pair("client_secret", &self.config.secret_key)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("grant_type", "authorization_code")
            .append_pair("code", code.as_str());
        Ok(url)
    }

    /// Current user's profile.
    pub fn me_url(&self) -> Result<Url, NetworkError> {
        join(&self.api_base, &["me"])
    }

    /// Public profile of `username`.
    pub fn user_url(&self, username: &str) -> Result<Url, NetworkError> {
        require_segment("username", username)?;
        join(&self.api_base, &["users", username])
    }

    /// One page of the photo listing.
    pub fn photos_url(&self, page: u32, per_page: u32) -> Result<Url, NetworkError> {
        let mut url = join(&self.api_base, &["photos"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());
        Ok(url)
    }

    /// Like endpoint of photo `id`.
    pub fn like_url(&self, id: &PhotoId) -> Result<Url, NetworkError> {
        require_segment("photo id", id.as_str())?;
        join(&self.api_base, &["photos", id.as_str(), "like"])
    }

    /// `Authorization` value for endpoints that identify the application.
    pub fn client_id_header(&self) -> String {
        format!("Client-ID {}", self.config.access_key)
    }
}

fn parse_base(raw: &str) -> Result<Url, NetworkError> {
    let url = Url::parse(raw)
        .map_err(|e| NetworkError::InvalidRequest(format!("invalid base URL {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(NetworkError::InvalidRequest(format!(
            "{raw:?} cannot be used as a base URL"
        )));
    }
    Ok(url)
}

fn require_segment(what: &str, value: &str) -> Result<(), NetworkError> {
    if value.trim().is_empty() {
        return Err(NetworkError::InvalidRequest(format!("empty {what}")));
    }
    Ok(())
}

/// Append path segments (percent-encoded) to `base`, keeping any base path.
fn join(base: &Url, segments: &[&str]) -> Result<Url, NetworkError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| NetworkError::InvalidRequest(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new(ClientConfig::new("access-123", "secret-456")).unwrap()
    }

    // ===========================================
    // Configuration Tests
    // ===========================================

    #[test]
    fn defaults() {
        let config = ClientConfig::new("a", "s");
        assert_eq!(config.per_page, 10);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.avatar_size, AvatarSize::Small);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn builder_pattern() {
        let config = ClientConfig::new("a", "s")
            .with_per_page(30)
            .with_timeout(Duration::from_secs(5))
            .with_avatar_size(AvatarSize::Large)
            .with_api_base_url("http://127.0.0.1:9000")
            .with_scope("public");

        assert_eq!(config.per_page, 30);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.avatar_size, AvatarSize::Large);
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.scope, "public");
    }

    #[test]
    fn debug_redacts_credentials() {
        let debug = format!("{:?}", ClientConfig::new("access-123", "secret-456"));
        assert!(!debug.contains("access-123"));
        assert!(!debug.contains("secret-456"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn avatar_size_picks_rendition() {
        let image = ProfileImage {
            small: "s".into(),
            medium: "m".into(),
            large: "l".into(),
        };
        assert_eq!(AvatarSize::Small.pick(&image), "s");
        assert_eq!(AvatarSize::Medium.pick(&image), "m");
        assert_eq!(AvatarSize::Large.pick(&image), "l");
    }

    // ===========================================
    // URL Construction Tests
    // ===========================================

    #[test]
    fn authorize_url_carries_client_and_scope() {
        let url = endpoints().authorize_url().unwrap();
        assert_eq!(url.path(), "/oauth/authorize");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("client_id".into(), "access-123".into())));
        assert!(query.contains(&("response_type".into(), "code".into())));
        assert!(query.contains(&("scope".into(), DEFAULT_SCOPE.into())));
        assert!(query.contains(&("redirect_uri".into(), DEFAULT_REDIRECT_URI.into())));
    }

    #[test]
    fn token_url_carries_exchange_parameters() {
        let url = endpoints().token_url(&AuthCode::new("codeA")).unwrap();
        assert_eq!(url.host_str(), Some("unsplash.com"));
        assert_eq!(url.path(), "/oauth/token");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("client_secret".into(), "secret-456".into())));
        assert!(query.contains(&("grant_type".into(), "authorization_code".into())));
        assert!(query.contains(&("code".into(), "codeA".into())));
    }

    #[test]
    fn empty_code_is_rejected() {
        let result = endpoints().token_url(&AuthCode::new(""));
        assert!(matches!(result, Err(NetworkError::InvalidRequest(_))));
    }

    #[test]
    fn photos_url_has_paging() {
        let url = endpoints().photos_url(2, 10).unwrap();
        assert_eq!(url.as_str(), "https://api.unsplash.com/photos?page=2&per_page=10");
    }

    #[test]
    fn like_url_and_user_url() {
        let e = endpoints();
        assert_eq!(
            e.like_url(&PhotoId::new("5")).unwrap().as_str(),
            "https://api.unsplash.com/photos/5/like"
        );
        assert_eq!(
            e.user_url("jdoe").unwrap().as_str(),
            "https://api.unsplash.com/users/jdoe"
        );
        assert_eq!(e.me_url().unwrap().as_str(), "https://api.unsplash.com/me");
    }

    #[test]
    fn path_segments_are_encoded() {
        let url = endpoints().like_url(&PhotoId::new("a/b")).unwrap();
        assert_eq!(url.path(), "/photos/a%2Fb/like");
    }

    #[test]
    fn empty_segments_are_rejected() {
        let e = endpoints();
        assert!(matches!(e.user_url(""), Err(NetworkError::InvalidRequest(_))));
        assert!(matches!(
            e.like_url(&PhotoId::new(" ")),
            Err(NetworkError::InvalidRequest(_))
        ));
    }

    #[test]
    fn base_path_is_kept() {
        let config = ClientConfig::new("a", "s").with_api_base_url("http://localhost:8080/api/");
        let e = Endpoints::new(config).unwrap();
        assert_eq!(e.me_url().unwrap().as_str(), "http://localhost:8080/api/me");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = ClientConfig::new("a", "s").with_api_base_url("not a url");
        assert!(matches!(
            Endpoints::new(config),
            Err(NetworkError::InvalidRequest(_))
        ));

        let config = ClientConfig::new("a", "s").with_auth_base_url("mailto:someone@example.com");
        assert!(matches!(
            Endpoints::new(config),
            Err(NetworkError::InvalidRequest(_))
        ));
    }

    #[test]
    fn client_id_header_format() {
        assert_eq!(endpoints().client_id_header(), "Client-ID access-123");
    }
}
