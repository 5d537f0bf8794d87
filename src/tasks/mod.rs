//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//! Each task talks to the core only through the public Group contract and
//! never holds the store lock across a network call.
//!
//! # Tasks
//! - Staleness scan: refreshes old entries and publishes expired keys
//! - Snapshot save: persists the store to disk on a timer
//! - Remote fill: resolves a peer's missed keys out of band

mod refresh;
mod remote_fill;
mod snapshot;

pub use refresh::spawn_refresh_task;
pub use remote_fill::{fill_one, spawn_remote_fill_task, PeerClient};
pub use snapshot::spawn_snapshot_task;
