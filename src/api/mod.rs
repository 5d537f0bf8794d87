//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `GET /cache/:group?key=K` - Serve a cached value, loading on miss
//! - `GET /cache/:group?missed=1` - Pop one unresolved key
//! - `POST /cache/:group` - Populate a peer-resolved value
//! - `GET /stats/:group` - Group counter snapshot
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
