//! Domain values built from wire payloads.
//!
//! Values here are immutable. A change (e.g. a like toggle) is expressed
//! by building a new value, see [`Photo::with_liked`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::parse_timestamp;
use crate::wire::{PhotoResult, ProfileResult};
use crate::PhotoId;

/// Pixel dimensions of a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PixelSize {
    /// Height divided by width, 0 for a zero-width image.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 {
            return 0.0;
        }
        f64::from(self.height) / f64::from(self.width)
    }
}

/// A photo in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Stable server id
    pub id: PhotoId,
    /// Original dimensions
    pub size: PixelSize,
    /// Creation time, if the server sent a parseable one
    pub created_at: Option<DateTime<Utc>>,
    /// Author supplied description
    pub description: Option<String>,
    /// URL shown in the list
    pub thumb_url: String,
    /// URL shown full screen
    pub full_url: String,
    /// Whether the current user liked it
    pub is_liked: bool,
}

impl Photo {
    /// A copy of this photo with `is_liked` replaced.
    pub fn with_liked(&self, liked: bool) -> Self {
        Self {
            is_liked: liked,
            ..self.clone()
        }
    }
}

impl From<PhotoResult> for Photo {
    fn from(result: PhotoResult) -> Self {
        Self {
            id: PhotoId::new(result.id),
            size: PixelSize {
                width: result.width,
                height: result.height,
            },
            created_at: result.created_at.as_deref().and_then(parse_timestamp),
            description: result.description,
            thumb_url: result.urls.regular,
            full_url: result.urls.full,
            is_liked: result.liked_by_user,
        }
    }
}

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Login name, also the key for the avatar lookup
    pub username: String,
    /// First and last name joined by a space
    pub display_name: String,
    /// `@username`
    pub login_handle: String,
    /// Biography
    pub bio: Option<String>,
}

impl From<ProfileResult> for Profile {
    fn from(result: ProfileResult) -> Self {
        let display_name = std::iter::once(result.first_name.as_str())
            .chain(result.last_name.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            login_handle: format!("@{}", result.username),
            username: result.username,
            display_name,
            bio: result.bio,
        }
    }
}
