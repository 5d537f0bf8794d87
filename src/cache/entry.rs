//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with population timestamps.

use std::time::{Duration, Instant};

use crate::cache::ByteView;

// == Cache Entry ==
/// A single cached entry.
///
/// `updated_at` records the moment the entry was last (re)populated, not
/// last accessed. Reads refresh recency order but leave the timestamp
/// alone so staleness is measured from population time.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The cache key
    pub key: String,
    /// The stored payload
    pub value: ByteView,
    /// When the value was last (re)populated
    pub updated_at: Instant,
}

impl Entry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(key: impl Into<String>, value: ByteView) -> Self {
        Self {
            key: key.into(),
            value,
            updated_at: Instant::now(),
        }
    }

    // == Weight ==
    /// Bytes charged against the store budget: key bytes plus value bytes.
    pub fn weight(&self) -> u64 {
        (self.key.len() + self.value.len()) as u64
    }

    // == Age ==
    /// Time since the entry was last populated.
    pub fn age(&self) -> Duration {
        self.updated_at.elapsed()
    }

    /// Whole minutes since the entry was last populated.
    pub fn age_minutes(&self) -> u64 {
        self.age().as_secs() / 60
    }

    // == Repopulate ==
    /// Replaces the value and stamps the entry as freshly populated.
    pub fn repopulate(&mut self, value: ByteView) {
        self.value = value;
        self.updated_at = Instant::now();
    }
}
