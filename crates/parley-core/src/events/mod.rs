//! Playback lifecycle events and the emitters that carry them.
//!
//! Every admitted play call produces exactly this sequence:
//!
//! ```text
//!   AttemptStarted ──► [PlayStarted] ──► Ended | Error | Blocked | Stopped
//! ```
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "play_started", "session": 3 }
//! ```

mod emitter;

use serde::{Deserialize, Serialize};

pub use emitter::{ChannelEmitter, FanoutEmitter, PlaybackEventEmitter};

/// Lifecycle event of one playback session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// A chunk was admitted and the session began (before decode).
    AttemptStarted {
        /// Session identifier.
        session: u64,
        /// Text being spoken.
        text: String,
    },

    /// The play request resolved and audio is audible.
    PlayStarted {
        /// Session identifier.
        session: u64,
    },

    /// Playback completed naturally.
    Ended {
        /// Session identifier.
        session: u64,
    },

    /// Decode or playback failed.
    Error {
        /// Session identifier.
        session: u64,
        /// Error description.
        reason: String,
    },

    /// The host refused to start playback (autoplay policy).
    Blocked {
        /// Session identifier.
        session: u64,
        /// Backend explanation.
        reason: String,
    },

    /// Playback was interrupted by `stop` or teardown.
    Stopped {
        /// Session identifier.
        session: u64,
    },
}

impl PlaybackEvent {
    /// Session this event belongs to.
    #[must_use]
    pub const fn session(&self) -> u64 {
        match self {
            Self::AttemptStarted { session, .. }
            | Self::PlayStarted { session }
            | Self::Ended { session }
            | Self::Error { session, .. }
            | Self::Blocked { session, .. }
            | Self::Stopped { session } => *session,
        }
    }

    /// Whether this event ends its session.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Ended { .. } | Self::Error { .. } | Self::Blocked { .. } | Self::Stopped { .. }
        )
    }
}
