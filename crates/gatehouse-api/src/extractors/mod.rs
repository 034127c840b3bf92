//! Custom Axum extractors.

pub mod auth;

pub use auth::{AUTH_COOKIE, AuthUser, REFRESH_COOKIE, token_carrier};
