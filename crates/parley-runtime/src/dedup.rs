//! Played-chunk tracking.
//!
//! Remembers every fingerprint that has been admitted for playback during the
//! lifetime of a chat view. There is no eviction: a chat session is bounded by
//! user interaction, so the set stays small.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use parley_core::Fingerprint;

/// Set of already-played audio fingerprints.
#[derive(Debug, Default)]
pub struct AudioChunkDeduplicator {
    played: Mutex<HashSet<Fingerprint>>,
}

impl AudioChunkDeduplicator {
    /// Create an empty deduplicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `fingerprint` has not been played yet.
    pub fn should_play(&self, fingerprint: &Fingerprint) -> bool {
        !self.lock().contains(fingerprint)
    }

    /// Record `fingerprint` as played. Repeated calls have no further effect.
    pub fn mark_played(&self, fingerprint: Fingerprint) {
        self.lock().insert(fingerprint);
    }

    /// Check and mark in one step.
    ///
    /// Returns `true` exactly once per fingerprint, even when two callers race.
    pub fn admit(&self, fingerprint: &Fingerprint) -> bool {
        self.lock().insert(fingerprint.clone())
    }

    /// Number of fingerprints recorded.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been played yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Fingerprint>> {
        // The set is always left consistent, so a poisoned lock is still usable.
        self.played.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
