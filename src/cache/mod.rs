//! Cache Module
//!
//! In-memory caching engine: byte-bounded LRU store with timestamped
//! entries, single-flight load coalescing, staleness-driven refresh,
//! miss publication and snapshot persistence.

mod byte_view;
mod entry;
mod flight;
mod group;
mod lru;
mod missed;
pub mod snapshot;
mod stats;
mod store;


// Re-export public types
pub use byte_view::ByteView;
pub use entry::Entry;
pub(crate) use flight::Flight;
pub use group::{
    Group, GroupRegistry, GroupSettings, DEFAULT_EXPIRE_MINUTES, DEFAULT_MISS_CAPACITY,
    DEFAULT_REFRESH_PACING,
};
pub use lru::RecencyList;
pub use missed::MissQueue;
pub use stats::{GroupStats, StatCounters};
pub use store::{ByteStore, EvictionHook};
