//! # gatehouse-api
//!
//! HTTP surface for Gatehouse built on Axum.
//!
//! Session routes (login, refresh, logout, me), administrator management,
//! a health probe, the `AuthUser` extractor and error-to-status mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, drain_activity, run_server};
pub use error::ApiError;
pub use state::AppState;
