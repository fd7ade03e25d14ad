//! # feed-core
//!
//! Pure logic for the photofeed session layer (no I/O, instant tests).
//!
//! This crate holds the bookkeeping the services in `feed-client` rely on,
//! without any network access, async runtime or clock:
//! - [`RequestGate`] decides whether a new request starts, is skipped as a
//!   duplicate, or supersedes the one in flight
//! - [`PageCursor`] tracks the next page to request
//! - [`PhotoFeed`] is the ordered photo list with replace-by-id updates
//! - [`SessionEvent`] is what subscribers get notified about
//!
//! The actual I/O is performed by `feed-client`, which consults these types
//! before starting a request and again before applying its result.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod events;
pub mod feed;
pub mod gate;
pub mod pagination;

pub use events::SessionEvent;
pub use feed::PhotoFeed;
pub use gate::{Admission, GatePolicy, RequestGate, Ticket};
pub use pagination::{PageCursor, DEFAULT_PER_PAGE};
