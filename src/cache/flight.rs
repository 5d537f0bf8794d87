//! Single-Flight Module
//!
//! Deduplicates concurrent loads for the same key. The first caller to
//! register becomes the leader and runs the load; every caller arriving
//! while it is in flight waits for the leader's result instead of issuing
//! a second upstream fetch. All waiters in one wave observe the identical
//! outcome, value or error.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::cache::ByteView;
use crate::error::{CacheError, Result};

type Outcome = Result<ByteView>;

// == Flight Tracker ==
/// In-flight load table keyed by cache key.
#[derive(Default)]
pub(crate) struct Flight {
    inflight: Mutex<HashMap<String, watch::Receiver<Option<Outcome>>>>,
}

enum Role {
    Leader(watch::Sender<Option<Outcome>>),
    Waiter(watch::Receiver<Option<Outcome>>),
}

impl Flight {
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Executes `load` for `key`, coalescing with any load already in
    /// flight for the same key.
    pub async fn run<F, Fut>(&self, key: &str, load: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let role = {
            let mut inflight = self.inflight.lock();
            match inflight.get(key) {
                Some(rx) => Role::Waiter(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    inflight.insert(key.to_string(), rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Waiter(mut rx) => match rx.wait_for(|outcome| outcome.is_some()).await {
                Ok(outcome) => (*outcome)
                    .clone()
                    .unwrap_or_else(|| Err(CacheError::LoadFailed("flight produced no result".into()))),
                // The leader was dropped before publishing a result
                Err(_) => Err(CacheError::LoadFailed("in-flight load was cancelled".into())),
            },
            Role::Leader(tx) => {
                // The guard clears the table entry even if `load` panics or
                // the leader future is dropped, so the key never wedges.
                let guard = FlightGuard { flight: self, key };
                let outcome = load().await;
                drop(guard);
                let _ = tx.send(Some(outcome.clone()));
                outcome
            }
        }
    }

    /// Number of keys currently being loaded.
    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.inflight.lock().len()
    }
}

// == Flight Guard ==
/// Removes the table entry for the leader's key on drop. The entry must be
/// gone before the result is published so a caller arriving afterwards
/// starts a fresh wave instead of observing a stale one.
struct FlightGuard<'a> {
    flight: &'a Flight,
    key: &'a str,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flight.inflight.lock().remove(self.key);
    }
}
