//! Signed access/refresh token pairs.

pub mod claims;
pub mod error;
pub mod service;

pub use claims::{Claims, TokenKind};
pub use error::VerifyError;
pub use service::{TokenPair, TokenService};
