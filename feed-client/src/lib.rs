//! # feed-client
//!
//! Session services for the photofeed API.
//!
//! This is the library applications use to sign in and browse the feed.
//!
//! ## Features
//!
//! - **OAuth code exchange**: each code is sent at most once, the token is persisted
//! - **Profile and avatar**: fetched once per request key, cached until logout
//! - **Paginated feed**: single-flight page loads, server-confirmed likes
//! - **Change notifications**: typed events over a broadcast channel
//! - **Transport abstraction**: reqwest for real traffic, a mock for tests
//!
//! ## Return conventions
//!
//! Service calls that can be de-duplicated return `Result<Option<T>, NetworkError>`:
//! `Ok(None)` means the call was dropped as a duplicate of one already in flight
//! (or, for token exchange, already completed) and nothing was sent. Errors are
//! only returned for requests that actually ran or could not be built.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use photofeed_client::{ClientConfig, MemoryCredentialStore, Session};
//!
//! let session = Session::with_reqwest(
//!     ClientConfig::new("access-key", "secret-key"),
//!     Arc::new(MemoryCredentialStore::new()),
//! )?;
//!
//! let mut events = session.subscribe();
//! session.feed().fetch_next_page().await?;
//! for photo in session.feed().photos() {
//!     println!("{} {}", photo.id, photo.thumb_url);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod http;
pub mod services;
pub mod session;
mod task;
pub mod transport;

pub use config::{AvatarSize, ClientConfig, Endpoints};
pub use credentials::{CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::NetworkError;
pub use events::EventBus;
pub use http::HttpEnvelope;
pub use services::{AvatarService, FeedService, ProfileService, TokenService};
pub use session::Session;
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, MockTransport, ReqwestTransport,
    TransportError,
};
