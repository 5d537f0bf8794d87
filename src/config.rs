//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Name of the cache group served by this process
    pub group_name: String,
    /// Byte budget for the store (0 disables eviction)
    pub cache_bytes: u64,
    /// Miss queue capacity
    pub miss_capacity: usize,
    /// Age in minutes past which an entry is considered stale for refresh
    pub stale_minutes: u64,
    /// Age in minutes past which an entry is published to the miss queue
    pub expire_minutes: u64,
    /// Maximum entries refreshed or published per scan pass
    pub refresh_batch: usize,
    /// Seconds between staleness scan passes
    pub refresh_interval: u64,
    /// Seconds between snapshot saves
    pub snapshot_interval: u64,
    /// Snapshot file path
    pub snapshot_path: PathBuf,
    /// Upstream loader timeout in seconds
    pub loader_timeout: u64,
    /// Peer base URL for the remote miss-fill loop; unset disables it
    pub peer_base_url: Option<String>,
    /// Seconds to back off when the peer reports no missed keys
    pub remote_fill_backoff: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 7295)
    /// - `GROUP_NAME` - cache namespace served here (default: "quotes")
    /// - `CACHE_BYTES` - store byte budget (default: 134217728)
    /// - `MISS_CAPACITY` - miss queue capacity (default: 5000)
    /// - `STALE_MINUTES` - refresh age threshold (default: 30)
    /// - `EXPIRE_MINUTES` - miss-publication age threshold (default: 30)
    /// - `REFRESH_BATCH` - entries per scan pass (default: 100)
    /// - `REFRESH_INTERVAL` - seconds between scan passes (default: 1800)
    /// - `SNAPSHOT_INTERVAL` - seconds between saves (default: 3600)
    /// - `SNAPSHOT_PATH` - snapshot file (default: /tmp/flightcache.json)
    /// - `LOADER_TIMEOUT` - upstream timeout seconds (default: 5)
    /// - `PEER_BASE_URL` - peer address; remote fill disabled when unset
    /// - `REMOTE_FILL_BACKOFF` - idle backoff seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            server_port: parse_env("SERVER_PORT", 7295),
            group_name: env::var("GROUP_NAME").unwrap_or_else(|_| "quotes".to_string()),
            cache_bytes: parse_env("CACHE_BYTES", 1 << 27),
            miss_capacity: parse_env("MISS_CAPACITY", 5000),
            stale_minutes: parse_env("STALE_MINUTES", 30),
            expire_minutes: parse_env("EXPIRE_MINUTES", 30),
            refresh_batch: parse_env("REFRESH_BATCH", 100),
            refresh_interval: parse_env("REFRESH_INTERVAL", 1800),
            snapshot_interval: parse_env("SNAPSHOT_INTERVAL", 3600),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/flightcache.json")),
            loader_timeout: parse_env("LOADER_TIMEOUT", 5),
            peer_base_url: env::var("PEER_BASE_URL").ok().filter(|s| !s.is_empty()),
            remote_fill_backoff: parse_env("REMOTE_FILL_BACKOFF", 60),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 7295,
            group_name: "quotes".to_string(),
            cache_bytes: 1 << 27,
            miss_capacity: 5000,
            stale_minutes: 30,
            expire_minutes: 30,
            refresh_batch: 100,
            refresh_interval: 1800,
            snapshot_interval: 3600,
            snapshot_path: PathBuf::from("/tmp/flightcache.json"),
            loader_timeout: 5,
            peer_base_url: None,
            remote_fill_backoff: 60,
        }
    }
}
