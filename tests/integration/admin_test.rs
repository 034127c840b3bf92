//! Integration tests for administrator management and role gates.

mod helpers;

use axum::http::StatusCode;

use helpers::{ROOT_PASSWORD, TestApp};

#[tokio::test]
async fn test_admin_role_is_denied_every_super_admin_route() {
    let app = TestApp::new().await;
    let target = app.create_test_admin("target", "Passw0rd").await;
    app.create_test_admin("plain", "Passw0rd").await;
    let token = app.login("plain", "Passw0rd").await;

    let create = app
        .request(
            "POST",
            "/api/admins",
            Some(serde_json::json!({ "username": "newbie", "password": "Passw0rd" })),
            Some(&token),
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);

    let delete = app
        .request("DELETE", &format!("/api/admins/{target}"), None, Some(&token))
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let password = app
        .request(
            "PUT",
            &format!("/api/admins/{target}/password"),
            Some(serde_json::json!({ "password": "N3wPassword" })),
            Some(&token),
        )
        .await;
    assert_eq!(password.status, StatusCode::FORBIDDEN);

    let list = app.request("GET", "/api/admins", None, Some(&token)).await;
    assert_eq!(list.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_require_a_token() {
    let app = TestApp::new().await;
    for (method, path) in [
        ("GET", "/api/admins"),
        ("POST", "/api/admins"),
        ("DELETE", "/api/admins/1"),
        ("PUT", "/api/admins/1/password"),
    ] {
        let response = app
            .request(method, path, Some(serde_json::json!({})), None)
            .await;
        assert_eq!(
            response.status,
            StatusCode::UNAUTHORIZED,
            "{method} {path}"
        );
    }
}

#[tokio::test]
async fn test_super_admin_cannot_delete_self() {
    let app = TestApp::new().await;
    let body = app.login_body("root", ROOT_PASSWORD).await;
    let token = body["data"]["access_token"].as_str().unwrap();
    let id = body["data"]["user"]["id"].as_i64().unwrap();

    let response = app
        .request("DELETE", &format!("/api/admins/{id}"), None, Some(token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_new_super_admin_uses_standard_password_rules() {
    let app = TestApp::new().await;
    let token = app.login("root", ROOT_PASSWORD).await;

    let weak = app
        .request(
            "POST",
            "/api/admins",
            Some(serde_json::json!({
                "username": "root2",
                "password": "alllowercase1",
                "role": "super_admin",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);

    let standard = app
        .request(
            "POST",
            "/api/admins",
            Some(serde_json::json!({
                "username": "root2",
                "password": "Passw0rd",
                "role": "super_admin",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(standard.status, StatusCode::CREATED);
    assert_eq!(standard.body["data"]["role"], "super_admin");
}

#[tokio::test]
async fn test_unknown_admin_is_not_found() {
    let app = TestApp::new().await;
    let token = app.login("root", ROOT_PASSWORD).await;

    let response = app
        .request(
            "PUT",
            "/api/admins/424242/password",
            Some(serde_json::json!({ "password": "N3wPassword" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}
