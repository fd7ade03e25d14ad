//! Identity and credential types for photofeed.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Path the authorization server redirects to after the user grants access.
const NATIVE_REDIRECT_PATH: &str = "/oauth/authorize/native";

/// Stable identifier of a photo, as assigned by the server.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    /// Create a PhotoId from its server representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PhotoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhotoId({})", self.0)
    }
}

/// A one-time OAuth authorization code.
///
/// Each value is meant to be exchanged for a token at most once.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthCode(String);

impl AuthCode {
    /// Wrap a raw authorization code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Extract the code from the URL the authorization page redirected to.
    ///
    /// Only redirects to the native callback path carrying a non-empty
    /// `code` query parameter are accepted.
    pub fn from_redirect(redirect: &Url) -> Option<Self> {
        if redirect.path() != NATIVE_REDIRECT_PATH {
            return None;
        }
        redirect
            .query_pairs()
            .find(|(name, _)| name == "code")
            .map(|(_, value)| value.into_owned())
            .filter(|code| !code.is_empty())
            .map(Self)
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "AuthCode({prefix}…)")
    }
}

/// A bearer access token.
///
/// `Debug` never prints the token itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken([{} chars REDACTED])", self.0.len())
    }
}
