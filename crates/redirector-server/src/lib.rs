//! # Redirector Server
//!
//! HTTP adapter for the domain redirector.
//!
//! This crate provides:
//! - Axum-based HTTP server with graceful shutdown
//! - `GET /redirect/:pool_id/*path` (and the empty path) answering `302 Found` or `404`
//! - Health and metrics endpoints
//! - Client address extraction

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use extractors::ClientIp;
pub use routes::create_router;
pub use server::{Server, ServerConfig, ServerError};
pub use shutdown::shutdown_signal;
pub use state::{AppState, AppStateBuilder};
