//! Role checks for handlers, delegating to the access guard.

use gatehouse_auth::guard::{ANY_ADMIN, SUPER_ADMIN_ONLY};

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Only super administrators pass.
pub fn require_super_admin(state: &AppState, auth: &AuthUser) -> Result<(), ApiError> {
    Ok(state.guard.authorize(auth, SUPER_ADMIN_ONLY)?)
}

/// Any administrator passes.
pub fn require_any_admin(state: &AppState, auth: &AuthUser) -> Result<(), ApiError> {
    Ok(state.guard.authorize(auth, ANY_ADMIN)?)
}
