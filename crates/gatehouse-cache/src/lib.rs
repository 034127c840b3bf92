//! # gatehouse-cache
//!
//! Key-value backends for the token revocation list:
//!
//! - **memory**: in-process store using [moka](https://crates.io/crates/moka) with per-entry TTL
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate
//! - **none**: no store; revocation checks degrade to "not revoked"
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
