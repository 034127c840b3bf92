//! Behaviour when the revocation store is missing, down or hanging.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{Harness, HangingCache, UnreachableCache};
use gatehouse_auth::{StoreHealth, TokenCarrier, TokenKind};
use gatehouse_entity::user::{UserRole, UserSummary};

fn user() -> UserSummary {
    UserSummary {
        id: 21,
        username: "rita".to_string(),
        role: UserRole::Admin,
    }
}

#[tokio::test]
async fn unreachable_store_accepts_valid_tokens() {
    let h = Harness::with_cache(Some(Arc::new(UnreachableCache)));
    let pair = h.tokens.issue_pair(&user()).unwrap();

    let claims = h
        .tokens
        .verify(&pair.access_token, TokenKind::Access)
        .await
        .unwrap();
    assert_eq!(claims.sub, 21);

    h.guard
        .authenticate(&TokenCarrier::bearer(pair.access_token))
        .await
        .unwrap();
    assert_eq!(h.tokens.revocations().health().await, StoreHealth::Degraded);
}

#[tokio::test]
async fn unreachable_store_does_not_fail_rotation_or_logout() {
    let h = Harness::with_cache(Some(Arc::new(UnreachableCache)));
    let pair = h.tokens.issue_pair(&user()).unwrap();

    let rotated = h.tokens.rotate(&pair.refresh_token).await.unwrap();
    assert_eq!(rotated.user.id, 21);

    h.tokens.revoke(&rotated.refresh_token).await.unwrap();
    h.authority.logout(&rotated.refresh_token).await.unwrap();
}

#[tokio::test]
async fn hanging_store_is_bounded() {
    let h = Harness::with_cache(Some(Arc::new(HangingCache)));
    let pair = h.tokens.issue_pair(&user()).unwrap();

    let started = Instant::now();
    h.tokens
        .verify(&pair.access_token, TokenKind::Access)
        .await
        .unwrap();
    h.tokens.revoke(&pair.access_token).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn no_store_configured_still_serves_sessions() {
    let h = Harness::with_cache(None);
    h.authority
        .register_admin(None, "sam", "Passw0rd", None)
        .await
        .unwrap();

    let pair = h.authority.login("sam", "Passw0rd").await.unwrap();
    h.authority.refresh(&pair.refresh_token).await.unwrap();
    h.authority.logout(&pair.refresh_token).await.unwrap();
    assert_eq!(h.tokens.revocations().health().await, StoreHealth::Disabled);
}
