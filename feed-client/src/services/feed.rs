//! Paginated photo feed with like/unlike.
//!
//! Page loads are single-flight: a call while a page is loading is dropped,
//! and the page counter only advances once a page has been merged. Like
//! mutations replace one another; the feed is only touched after the server
//! confirms, by swapping the photo (found by id) for an updated copy.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use photofeed_core::{Admission, GatePolicy, PageCursor, PhotoFeed, RequestGate, SessionEvent, Ticket};
use photofeed_types::{AccessToken, Photo, PhotoId, PhotoResult};

use crate::config::Endpoints;
use crate::credentials::CredentialStore;
use crate::error::NetworkError;
use crate::events::EventBus;
use crate::http::HttpEnvelope;
use crate::task::{cancelled, join, TaskSlot};
use crate::transport::{HttpRequest, Method};

/// The photo feed.
#[derive(Clone)]
pub struct FeedService {
    inner: Arc<FeedInner>,
}

struct FeedInner {
    http: HttpEnvelope,
    endpoints: Endpoints,
    credentials: Arc<dyn CredentialStore>,
    events: EventBus,
    state: Mutex<FeedState>,
}

struct FeedState {
    feed: PhotoFeed,
    cursor: PageCursor,
    page_gate: RequestGate<()>,
    page_task: TaskSlot,
    like_gate: RequestGate<PhotoId>,
    like_task: TaskSlot,
}

impl FeedService {
    /// Create an empty feed.
    pub fn new(
        http: HttpEnvelope,
        endpoints: Endpoints,
        credentials: Arc<dyn CredentialStore>,
        events: EventBus,
    ) -> Self {
        let per_page = endpoints.config().per_page;
        Self {
            inner: Arc::new(FeedInner {
                http,
                endpoints,
                credentials,
                events,
                state: Mutex::new(FeedState {
                    feed: PhotoFeed::new(),
                    cursor: PageCursor::new(per_page),
                    page_gate: RequestGate::new(GatePolicy::SkipWhileBusy),
                    page_task: TaskSlot::default(),
                    like_gate: RequestGate::new(GatePolicy::Replace),
                    like_task: TaskSlot::default(),
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Load the next page and append it.
    ///
    /// Returns the number of photos appended, or `Ok(None)` if a page load
    /// was already in flight. Subscribers get [`SessionEvent::FeedChanged`]
    /// after every merged page, including an empty one at the end of the feed.
    pub async fn fetch_next_page(&self) -> Result<Option<usize>, NetworkError> {
        let handle = {
            let mut state = self.lock();
            let ticket = match state.page_gate.admit(()) {
                Admission::Skip => {
                    tracing::debug!("Page load already in flight");
                    return Ok(None);
                }
                Admission::Start { ticket, .. } => ticket,
            };
            let page = state.cursor.next_page();
            let per_page = state.cursor.per_page();

            let this = self.clone();
            let handle = tokio::spawn(async move { this.run_page(ticket, page, per_page).await });
            state.page_task.replace(handle.abort_handle());
            handle
        };
        join(handle).await.map(Some)
    }

    async fn run_page(&self, ticket: Ticket, page: u32, per_page: u32) -> Result<usize, NetworkError> {
        let result = self.request_page(page, per_page).await;

        let added = {
            let mut state = self.lock();
            if !state.page_gate.complete(ticket) {
                return Err(cancelled());
            }
            let photos = match result {
                Ok(photos) => photos,
                Err(e) => {
                    tracing::warn!("Loading page {} failed: {}", page, e);
                    return Err(e);
                }
            };
            if !state.cursor.advance(page) {
                return Err(cancelled());
            }
            state.feed.append_page(photos)
        };

        tracing::debug!("Page {} merged ({} photos)", page, added);
        self.inner.events.publish(SessionEvent::FeedChanged);
        Ok(added)
    }

    async fn request_page(&self, page: u32, per_page: u32) -> Result<Vec<Photo>, NetworkError> {
        let endpoints = &self.inner.endpoints;
        let request = HttpRequest::get(endpoints.photos_url(page, per_page)?)
            .with_header("Authorization", endpoints.client_id_header());
        let results: Vec<PhotoResult> = self.inner.http.execute_decoded(request).await?;
        Ok(results.into_iter().map(Photo::from).collect())
    }

    // =========================================================================
    // Likes
    // =========================================================================

    /// Like or unlike photo `id`.
    ///
    /// Any like mutation still in flight is cancelled first. Fails with
    /// [`NetworkError::Unauthenticated`] when no token is stored. On success
    /// the photo's like flag is set to `liked`; a photo no longer in the feed
    /// is ignored. On failure the feed is unchanged.
    ///
    /// The flag is set, not toggled: to flip a photo pass `!photo.is_liked`.
    pub async fn set_liked(&self, id: PhotoId, liked: bool) -> Result<(), NetworkError> {
        let handle = {
            let mut state = self.lock();
            if state.like_gate.cancel().is_some() {
                tracing::debug!("Cancelling previous like mutation");
            }
            state.like_task.abort();

            let token = self
                .inner
                .credentials
                .token()
                .ok_or(NetworkError::Unauthenticated)?;

            let ticket = match state.like_gate.admit(id.clone()) {
                Admission::Start { ticket, .. } => ticket,
                Admission::Skip => return Ok(()),
            };

            let this = self.clone();
            let handle = tokio::spawn(async move { this.run_like(ticket, id, liked, token).await });
            state.like_task.replace(handle.abort_handle());
            handle
        };
        join(handle).await
    }

    async fn run_like(
        &self,
        ticket: Ticket,
        id: PhotoId,
        liked: bool,
        token: AccessToken,
    ) -> Result<(), NetworkError> {
        let result = self.request_like(&id, liked, &token).await;

        let mut state = self.lock();
        if !state.like_gate.complete(ticket) {
            return Err(cancelled());
        }
        if let Err(e) = result {
            tracing::warn!("Changing like on photo {} failed: {}", id, e);
            return Err(e);
        }
        if state.feed.set_liked(&id, liked).is_none() {
            tracing::debug!("Photo {} is no longer in the feed", id);
        }
        Ok(())
    }

    async fn request_like(&self, id: &PhotoId, liked: bool, token: &AccessToken) -> Result<(), NetworkError> {
        let method = if liked { Method::Post } else { Method::Delete };
        let request = HttpRequest::new(method, self.inner.endpoints.like_url(id)?)
            .with_header("Authorization", token.bearer_header())
            .with_header("Accept", "application/json");
        self.inner.http.execute_discarding_body(request).await
    }

    // =========================================================================
    // Snapshots and reset
    // =========================================================================

    /// Snapshot of the feed.
    pub fn photos(&self) -> Vec<Photo> {
        self.lock().feed.snapshot()
    }

    /// Copy of photo `id`.
    pub fn photo(&self, id: &PhotoId) -> Option<Photo> {
        self.lock().feed.get(id).cloned()
    }

    /// Number of photos loaded.
    pub fn len(&self) -> usize {
        self.lock().feed.len()
    }

    /// Whether no photos are loaded.
    pub fn is_empty(&self) -> bool {
        self.lock().feed.is_empty()
    }

    /// Page number the next load will request.
    pub fn next_page(&self) -> u32 {
        self.lock().cursor.next_page()
    }

    /// Whether a page load is in flight.
    pub fn is_loading(&self) -> bool {
        self.lock().page_gate.is_busy()
    }

    /// Clear the feed and page counter and cancel in-flight requests.
    /// Safe to call any number of times.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.page_gate.cancel();
        state.page_task.abort();
        state.like_gate.cancel();
        state.like_task.abort();
        state.feed.clear();
        state.cursor.reset();
    }
}
