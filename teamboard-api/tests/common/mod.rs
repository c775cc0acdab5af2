//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An app wired against the in-memory store
//! - Test user creation without password hashing
//! - JWT token generation
//! - Request helpers returning status and JSON body

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use teamboard_api::app::{build_router, AppState};
use teamboard_api::config::Config;
use teamboard_shared::auth::jwt::TokenType;
use teamboard_shared::models::user::{NewUser, User};
use teamboard_shared::store::{memory::MemoryStore, Store};
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub state: AppState,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a new test context over an empty in-memory store
    pub fn new() -> Self {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let state = AppState::new(store, Config::for_tests(TEST_SECRET));
        let app = build_router(state.clone());

        TestContext { state, app }
    }

    /// Inserts a user directly; the password hash is a placeholder
    pub async fn create_user(&self, name: &str) -> User {
        self.state
            .store
            .create_user(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "not-a-real-hash".to_string(),
                avatar_initials: None,
            })
            .await
            .unwrap()
    }

    /// Bearer header value carrying an access token for `user`
    pub fn auth_header(&self, user: &User) -> String {
        let token = self
            .state
            .services
            .users
            .jwt()
            .issue(&user.email, TokenType::Access)
            .unwrap();
        format!("Bearer {}", token)
    }

    /// Sends a request, optionally authenticated and with a JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<&User>,
        body: Option<Value>,
    ) -> Response {
        let authorization = user.map(|u| self.auth_header(u));
        self.dispatch(method, uri, authorization, body).await
    }

    async fn dispatch(
        &self,
        method: &str,
        uri: &str,
        authorization: Option<String>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().call(request).await.unwrap()
    }

    /// Like [`send`](Self::send), returning the status and parsed body
    ///
    /// Empty bodies parse as `Value::Null`.
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        user: Option<&User>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        read_json(self.send(method, uri, user, body).await).await
    }

    /// Sends with a raw bearer token, e.g. one obtained from login
    pub async fn json_with_token(
        &self,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self
            .dispatch(method, uri, Some(format!("Bearer {}", token)), body)
            .await;
        read_json(response).await
    }

    /// Creates a workspace through the API and returns its id
    pub async fn create_workspace(&self, owner: &User, name: &str) -> i64 {
        let (status, body) = self
            .json(
                "POST",
                "/api/workspaces",
                Some(owner),
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    /// Creates a project through the API and returns its id
    pub async fn create_project(&self, user: &User, workspace_id: i64, name: &str) -> i64 {
        let (status, body) = self
            .json(
                "POST",
                &format!("/api/workspaces/{}/projects", workspace_id),
                Some(user),
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }
}

async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
