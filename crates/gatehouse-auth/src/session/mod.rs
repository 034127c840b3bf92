//! The session authority: login, refresh, logout and administrator management.

pub mod authority;

pub use authority::{INVALID_CREDENTIALS, SessionAuthority};
