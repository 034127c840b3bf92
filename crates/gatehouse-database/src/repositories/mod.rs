//! PostgreSQL repository implementations.

pub mod activity;
pub mod user;

pub use activity::ActivityLogRepository;
pub use user::PgCredentialStore;
