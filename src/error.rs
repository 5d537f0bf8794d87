//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache engine and its HTTP boundary.
///
/// Cloneable because one load outcome is broadcast to every coalesced
/// waiter of a single-flight wave.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// An empty key was supplied
    #[error("key is required")]
    InvalidKey,

    /// The named group was never registered
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// The loader returned an error for a missed key
    #[error("load failed: {0}")]
    LoadFailed(String),

    /// The upstream is transiently unreachable
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Snapshot save/load I/O or serialization failure
    #[error("snapshot {op} failed: {cause}")]
    PersistenceFailed { op: &'static str, cause: String },
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            // Transient upstream trouble surfaces the same way a failed load does
            CacheError::LoadFailed(_) | CacheError::UpstreamUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            CacheError::PersistenceFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
