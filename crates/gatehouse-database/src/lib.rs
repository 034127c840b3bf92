//! # gatehouse-database
//!
//! The credential store contract ([`CredentialStore`]) plus its PostgreSQL
//! and in-memory implementations, the activity log repository, pool
//! management and migrations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryCredentialStore;
pub use repositories::{ActivityLogRepository, PgCredentialStore};
pub use store::{BoundedStore, CredentialStore};
