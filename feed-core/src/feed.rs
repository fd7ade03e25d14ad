//! The ordered photo list.
//!
//! The feed only grows by whole pages appended at the end. The one other
//! change it accepts is swapping a single photo for an updated copy, located
//! by id. Readers get owned snapshots, never a reference into the list.

use photofeed_types::{Photo, PhotoId};

/// Ordered, append-only list of photos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoFeed {
    photos: Vec<Photo>,
}

impl PhotoFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page in server order and return how many photos it added.
    pub fn append_page(&mut self, page: Vec<Photo>) -> usize {
        let added = page.len();
        self.photos.extend(page);
        added
    }

    /// Replace the photo with `id` by a copy whose like flag is `liked`.
    ///
    /// Returns the index that was replaced, or `None` if the photo is not
    /// in the feed (in which case nothing changes).
    pub fn set_liked(&mut self, id: &PhotoId, liked: bool) -> Option<usize> {
        let index = self.position(id)?;
        let updated = self.photos[index].with_liked(liked);
        self.photos[index] = updated;
        Some(index)
    }

    /// Index of the first photo with `id`.
    pub fn position(&self, id: &PhotoId) -> Option<usize> {
        self.photos.iter().position(|photo| &photo.id == id)
    }

    /// Look up a photo by id.
    pub fn get(&self, id: &PhotoId) -> Option<&Photo> {
        self.photos.iter().find(|photo| &photo.id == id)
    }

    /// Owned copy of the current list.
    pub fn snapshot(&self) -> Vec<Photo> {
        self.photos.clone()
    }

    /// Number of photos.
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Drop all photos.
    pub fn clear(&mut self) {
        self.photos.clear();
    }
}
