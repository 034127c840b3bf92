//! Integration tests for the session flow.

mod helpers;

use axum::http::StatusCode;

use helpers::{ROOT_PASSWORD, TestApp};

#[tokio::test]
async fn test_login_returns_bearer_pair() {
    let app = TestApp::new().await;
    app.create_test_admin("testuser", "Passw0rd").await;

    let body = app.login_body("testuser", "Passw0rd").await;
    let data = &body["data"];

    assert_eq!(body["success"], true);
    assert_eq!(data["token_type"], "Bearer");
    assert_eq!(data["expires_in"], 900);
    assert_eq!(data["user"]["username"], "testuser");
    assert_eq!(data["user"]["role"], "admin");
    assert!(data["user"].get("password_hash").is_none());
    assert_ne!(data["access_token"], data["refresh_token"]);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    app.create_test_admin("testuser2", "Passw0rd").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/login",
            Some(serde_json::json!({ "username": "testuser2", "password": "Wrongpass1" })),
            None,
        )
        .await;
    let unknown_user = app
        .request(
            "POST",
            "/api/login",
            Some(serde_json::json!({ "username": "nobody", "password": "Wrongpass1" })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_empty_credentials_fail_validation() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/login",
            Some(serde_json::json!({ "username": "", "password": "" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_authenticated() {
    let app = TestApp::new().await;
    let token = app.login("root", ROOT_PASSWORD).await;

    let response = app.request("GET", "/api/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["username"], "root");
    assert_eq!(response.body["data"]["role"], "super_admin");
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new().await;
    let body = app.login_body("root", ROOT_PASSWORD).await;
    let refresh = body["data"]["refresh_token"].as_str().unwrap();

    let response = app.request("GET", "/api/me", None, Some(refresh)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rotation_chain() {
    let app = TestApp::new().await;
    let body = app.login_body("root", ROOT_PASSWORD).await;
    let first = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let second = app
        .request(
            "POST",
            "/api/refresh",
            Some(serde_json::json!({ "refresh_token": first })),
            None,
        )
        .await;
    assert_eq!(second.status, StatusCode::OK);
    let second_token = second.body["data"]["refresh_token"].as_str().unwrap();

    let replay = app
        .request(
            "POST",
            "/api/refresh",
            Some(serde_json::json!({ "refresh_token": first })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);

    let third = app
        .request(
            "POST",
            "/api/refresh",
            Some(serde_json::json!({ "refresh_token": second_token })),
            None,
        )
        .await;
    assert_eq!(third.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_any_token() {
    let app = TestApp::new().await;
    let response = app.request("POST", "/api/refresh", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_tokens_still_succeeds() {
    let app = TestApp::new().await;
    let response = app.request("POST", "/api/logout", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}
