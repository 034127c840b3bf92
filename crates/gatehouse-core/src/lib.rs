//! # gatehouse-core
//!
//! Core crate for Gatehouse. Contains configuration schemas, the
//! revocation-store trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Gatehouse crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
