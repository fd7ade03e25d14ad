//! Mock transport for testing.
//!
//! Replies are queued up front and handed out in request order. Every request
//! is recorded. The transport can be paused so requests stay in flight until
//! the test resumes it, which is how overlapping calls are exercised.

use super::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, Notify};

/// How long [`MockTransport::wait_for_requests`] waits before giving up.
const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Mock transport for testing.
///
/// Clones share state, so a test keeps one handle and gives another to the
/// code under test.
#[derive(Debug, Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
    paused: Arc<watch::Sender<bool>>,
    recorded: Arc<Notify>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    requests: Vec<HttpRequest>,
    replies: VecDeque<Result<HttpResponse, TransportError>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a mock transport with no queued replies.
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner::default())),
            paused: Arc::new(paused),
            recorded: Arc::new(Notify::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a reply for the next request.
    pub fn queue_response(&self, response: HttpResponse) {
        self.lock().replies.push_back(Ok(response));
    }

    /// Queue a JSON reply with the given status.
    pub fn queue_json(&self, status: u16, body: &serde_json::Value) {
        self.queue_response(HttpResponse::new(status, body.to_string()));
    }

    /// Queue a reply with the given status and an empty body.
    pub fn queue_status(&self, status: u16) {
        self.queue_response(HttpResponse::new(status, Vec::new()));
    }

    /// Make the next request fail below HTTP.
    pub fn queue_error(&self, error: TransportError) {
        self.lock().replies.push_back(Err(error));
    }

    /// All requests received so far, oldest first.
    pub fn sent_requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.lock().requests.last().cloned()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of replies not yet consumed.
    pub fn pending_replies(&self) -> usize {
        self.lock().replies.len()
    }

    /// Hold every request in flight until [`resume`](Self::resume).
    ///
    /// Requests are recorded (and their reply chosen) on arrival, then wait.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    /// Let held and future requests complete.
    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Wait until at least `count` requests have arrived.
    ///
    /// Returns `false` if that did not happen within a few seconds.
    pub async fn wait_for_requests(&self, count: usize) -> bool {
        let arrived = async {
            loop {
                let notified = self.recorded.notified();
                if self.request_count() >= count {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(WAIT_LIMIT, arrived).await.is_ok()
    }

    /// Clear recorded requests and queued replies, and resume.
    pub fn reset(&self) {
        *self.lock() = MockTransportInner::default();
        self.resume();
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let reply = {
            let mut inner = self.lock();
            inner.requests.push(request);
            inner.replies.pop_front()
        };
        self.recorded.notify_waiters();

        let mut paused = self.paused.subscribe();
        // The sender lives as long as `self`, so this only returns once resumed
        let _ = paused.wait_for(|held| !*held).await;

        reply.unwrap_or_else(|| Err(TransportError::ConnectionFailed("no reply queued".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpRequest;
    use serde_json::json;
    use url::Url;

    fn request(path: &str) -> HttpRequest {
        HttpRequest::get(Url::parse(&format!("https://api.example{path}")).unwrap())
    }

    // ===========================================
    // Queued Replies
    // ===========================================

    #[tokio::test]
    async fn replies_are_handed_out_in_order() {
        let transport = MockTransport::new();
        transport.queue_json(200, &json!({"n": 1}));
        transport.queue_status(204);

        let first = transport.execute(request("/a")).await.unwrap();
        let second = transport.execute(request("/b")).await.unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(first.body, br#"{"n":1}"#);
        assert_eq!(second.status, 204);
        assert!(second.body.is_empty());
    }

    #[tokio::test]
    async fn empty_queue_fails_request() {
        let transport = MockTransport::new();
        let result = transport.execute(request("/a")).await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn queued_error_is_returned() {
        let transport = MockTransport::new();
        transport.queue_error(TransportError::Timeout);
        transport.queue_status(200);

        assert_eq!(
            transport.execute(request("/a")).await,
            Err(TransportError::Timeout)
        );
        assert!(transport.execute(request("/b")).await.is_ok());
    }

    // ===========================================
    // Request Recording
    // ===========================================

    #[tokio::test]
    async fn requests_are_recorded() {
        let transport = MockTransport::new();
        transport.queue_status(200);
        transport.queue_status(200);

        transport.execute(request("/first")).await.unwrap();
        transport.execute(request("/second")).await.unwrap();

        let sent = transport.sent_requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].url.path(), "/first");
        assert_eq!(transport.last_request().unwrap().url.path(), "/second");
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let transport = MockTransport::new();
        let other = transport.clone();
        transport.queue_status(200);

        other.execute(request("/a")).await.unwrap();

        assert_eq!(transport.request_count(), 1);
        assert_eq!(transport.pending_replies(), 0);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let transport = MockTransport::new();
        transport.queue_status(200);
        transport.queue_status(200);
        transport.execute(request("/a")).await.unwrap();

        transport.reset();

        assert_eq!(transport.request_count(), 0);
        assert_eq!(transport.pending_replies(), 0);
    }

    // ===========================================
    // Pause / Resume
    // ===========================================

    #[tokio::test]
    async fn paused_requests_wait_for_resume() {
        let transport = MockTransport::new();
        transport.queue_status(200);
        transport.pause();

        let handle = {
            let transport = transport.clone();
            tokio::spawn(async move { transport.execute(request("/held")).await })
        };

        assert!(transport.wait_for_requests(1).await);
        assert!(!handle.is_finished());

        transport.resume();
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn wait_for_requests_times_out() {
        tokio::time::pause();
        let transport = MockTransport::new();
        assert!(!transport.wait_for_requests(1).await);
    }
}
