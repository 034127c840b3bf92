//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use gatehouse_api::AppState;
use gatehouse_core::config::AppConfig;

/// Also passes the opt-in strict super administrator profile.
pub const ROOT_PASSWORD: &str = "vK9#qLm2$Wz7!pR4";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for setting up fixtures directly
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application on in-memory stores with a seeded
    /// super administrator `root`.
    pub async fn new() -> Self {
        let config = AppConfig::in_memory("integration-secret");
        let state = gatehouse_api::build_state(config)
            .await
            .expect("Failed to build state");
        state
            .authority
            .seed_super_admin("root", ROOT_PASSWORD)
            .await
            .expect("Failed to seed super administrator");

        Self {
            router: gatehouse_api::build_app(state.clone()),
            state,
        }
    }

    /// Create an administrator directly and return its id
    pub async fn create_test_admin(&self, username: &str, password: &str) -> i64 {
        self.state
            .authority
            .register_admin(None, username, password, None)
            .await
            .expect("Failed to create test admin")
            .id
    }

    /// Login and return the full response body
    pub async fn login_body(&self, username: &str, password: &str) -> Value {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let response = self.request("POST", "/api/login", Some(body), None).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body
    }

    /// Login and return JWT access token
    pub async fn login(&self, username: &str, password: &str) -> String {
        self.login_body(username, password).await["data"]["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
