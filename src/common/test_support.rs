//! Shared helpers for router-level tests

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::auth::password::hash_password;
use crate::common::migrations::test_pool;
use crate::common::{AppConfig, AppState};
use crate::users::models::{NewUser, Role};

pub const PASSWORD: &str = "girasol-2024";

pub async fn setup() -> (Router, Arc<AppState>) {
    let config = AppConfig {
        jwt_secret: "test_secret_key".to_string(),
        ..AppConfig::default()
    };
    let state = Arc::new(AppState::new(test_pool().await, config));
    (crate::build_router(state.clone()), state)
}

/// Inserts a user with [`PASSWORD`] and returns its id
pub async fn create_user(state: &AppState, email: &str, role: Role) -> String {
    state
        .users
        .create(NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: hash_password(PASSWORD).unwrap(),
            role: Some(role),
            avatar: None,
        })
        .await
        .unwrap()
        .id
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

/// Creates a user and returns a session token for it
pub async fn login_as(app: &Router, state: &AppState, email: &str, role: Role) -> (String, String) {
    let id = create_user(state, email, role).await;
    let (status, body) = login(app, email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    (id, body["token"].as_str().unwrap().to_string())
}
