//! JSON payloads exchanged with the photo API.
//!
//! Field names follow the server's snake_case schema. Optional fields
//! tolerate both `null` and absence.

use serde::{Deserialize, Serialize};

use crate::AccessToken;

/// Response body of `POST /oauth/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokenResponse {
    /// The bearer token
    pub access_token: AccessToken,
    /// Token type, normally `bearer`
    pub token_type: String,
    /// Space separated scopes granted
    pub scope: String,
}

/// Response body of `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResult {
    /// Login name
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name, missing for some accounts
    #[serde(default)]
    pub last_name: Option<String>,
    /// Free-form biography
    #[serde(default)]
    pub bio: Option<String>,
}

/// Response body of `GET /users/{username}`, reduced to what the client reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResult {
    /// Avatar URLs in several sizes
    pub profile_image: ProfileImage,
}

/// Avatar URLs in the sizes the server offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileImage {
    /// 32x32
    pub small: String,
    /// 64x64
    pub medium: String,
    /// 128x128
    pub large: String,
}

/// One element of the `GET /photos` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoResult {
    /// Photo id
    pub id: String,
    /// Creation timestamp, ISO 8601 with or without fractional seconds
    #[serde(default)]
    pub created_at: Option<String>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Whether the authenticated user liked the photo
    #[serde(default)]
    pub liked_by_user: bool,
    /// Author supplied description
    #[serde(default)]
    pub description: Option<String>,
    /// Image renditions
    pub urls: UrlsResult,
}

/// Image renditions of a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlsResult {
    /// Original upload
    pub raw: String,
    /// Full resolution JPEG
    pub full: String,
    /// 1080px wide
    pub regular: String,
    /// 400px wide
    pub small: String,
    /// 200px wide
    pub thumb: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_decodes() {
        let json = r#"{"access_token":"abc","token_type":"bearer","scope":"public read_user","created_at":1700000000}"#;
        let body: OAuthTokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.access_token.as_str(), "abc");
        assert_eq!(body.token_type, "bearer");
    }

    #[test]
    fn profile_without_last_name_decodes() {
        let json = r#"{"username":"jdoe","first_name":"Jane","last_name":null}"#;
        let body: ProfileResult = serde_json::from_str(json).unwrap();
        assert_eq!(body.last_name, None);
        assert_eq!(body.bio, None);
    }

    #[test]
    fn photo_page_decodes_with_missing_optionals() {
        let json = r#"[{
            "id": "LBI7cgq3pbM",
            "width": 5245,
            "height": 3497,
            "liked_by_user": true,
            "urls": {
                "raw": "https://images.example/raw",
                "full": "https://images.example/full",
                "regular": "https://images.example/regular",
                "small": "https://images.example/small",
                "thumb": "https://images.example/thumb"
            }
        }]"#;
        let page: Vec<PhotoResult> = serde_json::from_str(json).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].created_at, None);
        assert_eq!(page[0].description, None);
        assert!(page[0].liked_by_user);
    }

    #[test]
    fn user_result_ignores_unknown_fields() {
        let json = r#"{"id":"u1","profile_image":{"small":"s","medium":"m","large":"l"},"bio":"x"}"#;
        let body: UserResult = serde_json::from_str(json).unwrap();
        assert_eq!(body.profile_image.small, "s");
    }
}
