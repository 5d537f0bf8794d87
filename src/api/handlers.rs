//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::{ByteView, Group, GroupRegistry};
use crate::error::{CacheError, Result};
use crate::models::{CacheQuery, HealthResponse, StatsResponse, UpdateRequest};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registry of named cache groups
    pub registry: Arc<GroupRegistry>,
}

impl AppState {
    /// Creates a new AppState around an existing registry.
    pub fn new(registry: Arc<GroupRegistry>) -> Self {
        Self { registry }
    }

    fn group(&self, name: &str) -> Result<Arc<Group>> {
        self.registry
            .get(name)
            .ok_or_else(|| CacheError::GroupNotFound(name.to_string()))
    }
}

/// Handler for GET /cache/:group
///
/// Two modes, selected by the query string:
/// - `?key=K` serves the value for K, loading it from upstream on a miss.
///   The body is the raw value bytes.
/// - `?missed=1` pops one unresolved key from the miss queue; the body is
///   empty when none is pending.
pub async fn cache_get_handler(
    State(state): State<AppState>,
    Path(group_name): Path<String>,
    Query(params): Query<CacheQuery>,
) -> Result<Response> {
    let group = state.group(&group_name)?;

    if params.missed.is_some() {
        let key = group.pop_missed().unwrap_or_default();
        return Ok(key.into_response());
    }

    let key = params.key.ok_or(CacheError::InvalidKey)?;
    let view = group.get(&key).await?;
    Ok(view.to_vec().into_response())
}

/// Handler for POST /cache/:group
///
/// Populates the store directly with a peer-resolved value, bypassing the
/// loader.
pub async fn cache_update_handler(
    State(state): State<AppState>,
    Path(group_name): Path<String>,
    Json(req): Json<UpdateRequest>,
) -> Result<StatusCode> {
    let group = state.group(&group_name)?;
    if req.key.is_empty() {
        return Err(CacheError::InvalidKey);
    }

    group.populate(&req.key, ByteView::from(req.value));
    Ok(StatusCode::OK)
}

/// Handler for GET /stats/:group
///
/// Returns the group's counter snapshot.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(group_name): Path<String>,
) -> Result<Json<StatsResponse>> {
    let group = state.group(&group_name)?;
    Ok(Json(StatsResponse::new(group.name(), group.stats())))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
