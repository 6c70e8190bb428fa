//! HTTP server for the solace support companion.
//!
//! Exposes the conversation orchestrator as a small JSON API under `/api`
//! and optionally serves the static front end.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod types;

pub use app::{AppState, router, serve};
pub use config::ServerConfig;
pub use error::{ApiError, StartupError};
