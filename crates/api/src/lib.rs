//! HTTP surface of the query service.
//!
//! Endpoints:
//! - GET /health — liveness and active store
//! - GET /api/query — catalog of the nine queries
//! - GET /api/query/{1..9} — run one query

pub mod routes;
pub mod state;
