//! Change notifications for the presentation layer.

/// Events published to subscribers after service state changed.
///
/// Events are published only after the state they describe is in place,
/// so a subscriber that reads a snapshot on receipt sees the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// New photos were appended to the feed.
    FeedChanged,
    /// A new avatar URL was cached.
    AvatarChanged {
        /// The new avatar URL.
        url: String,
    },
    /// The session was torn down; show the signed-out view.
    SessionEnded,
}

impl SessionEvent {
    /// Short name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FeedChanged => "feed-changed",
            Self::AvatarChanged { .. } => "avatar-changed",
            Self::SessionEnded => "session-ended",
        }
    }
}
