//! The session services.
//!
//! Every service is cheap to clone (clones share state) and follows the same
//! shape: admit the call through a [`RequestGate`](photofeed_core::RequestGate),
//! spawn the round-trip, then apply the result under the service lock only
//! if its ticket is still current.

mod avatar;
mod feed;
mod profile;
mod token;

pub use avatar::AvatarService;
pub use feed::FeedService;
pub use profile::ProfileService;
pub use token::TokenService;
