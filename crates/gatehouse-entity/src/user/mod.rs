//! Administrative identity entities.

pub mod model;
pub mod role;

pub use model::{NewUser, User, UserSummary};
pub use role::UserRole;
