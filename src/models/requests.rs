//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::{Deserialize, Serialize};

/// Request body for the populate operation (POST /cache/:group).
///
/// Serialize is derived too: the remote-fill loop sends this same shape to
/// a peer's update endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// The cache key
    pub key: String,
    /// The resolved value
    pub value: String,
}

/// Query string for GET /cache/:group.
///
/// Exactly one of the two modes applies: `key=K` serves a value,
/// `missed=1` pops one unresolved key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheQuery {
    /// Key to fetch
    #[serde(default)]
    pub key: Option<String>,
    /// Any present value switches the request into missed-pop mode
    #[serde(default)]
    pub missed: Option<String>,
}
