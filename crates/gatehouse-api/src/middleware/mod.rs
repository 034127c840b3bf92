//! Request middleware and role-check helpers.

pub mod logging;
pub mod rbac;
