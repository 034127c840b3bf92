//! Administrator management handlers.

pub mod users;
