//! REST API module
//!
//! This module provides the HTTP server and REST API endpoints including:
//! - API routing and request handling
//! - Extractors that reject with the common error body
//! - Trace ids and security headers
//! - Request and response models

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use middleware::{trace_id_middleware, TraceId, TRACE_ID_HEADER};
pub use server::ApiServer;
