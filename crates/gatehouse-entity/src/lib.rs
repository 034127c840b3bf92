//! # gatehouse-entity
//!
//! Domain value types for Gatehouse. `User` mirrors a credential store row;
//! `UserSummary` is the outward-safe projection of it that clients see.

pub mod activity;
pub mod user;
