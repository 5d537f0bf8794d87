//! flightcache - an in-memory caching layer for an unreliable upstream
//!
//! Byte-bounded LRU store with single-flight load coalescing, staleness
//! refresh, miss publication for cooperating peers and snapshot
//! persistence.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{ByteView, Group, GroupRegistry, GroupSettings};
pub use config::Config;
pub use error::{CacheError, Result};
pub use loader::{HttpLoader, Loader, LoaderFn};
