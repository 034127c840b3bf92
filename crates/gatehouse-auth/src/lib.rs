//! # gatehouse-auth
//!
//! Credential issuance and enforcement for Gatehouse administrators.
//!
//! ## Modules
//!
//! - `password`: password policy and Argon2id hashing
//! - `jwt`: signed access/refresh token pairs, verification and rotation
//! - `revocation`: the hashed-token denylist with timeout, retry and fail-open reads
//! - `session`: login, refresh, logout and administrator management
//! - `guard`: request-time authentication and role checks
//! - `activity`: fire-and-forget activity recording

pub mod activity;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod revocation;
pub mod session;

pub use activity::{ActivityRecorder, ActivitySink, ActivityWorker, TracingActivitySink};
pub use guard::{AccessGuard, Principal, TokenCarrier};
pub use jwt::{Claims, TokenKind, TokenPair, TokenService, VerifyError};
pub use password::{PasswordHasher, PasswordPolicy, PolicyProfile, PolicyViolation};
pub use revocation::{ClaimOutcome, RevocationList, RevocationStatus, StoreHealth};
pub use session::SessionAuthority;
