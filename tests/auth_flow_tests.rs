// SPDX-License-Identifier: MIT

//! OAuth login and callback flow tests.
//!
//! The callback tests exercise the early transitions of the login
//! sequence (state check, code check) without touching the network:
//! every case here fails before the token exchange step.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_login_redirects_to_provider() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/microsoft/login")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());

    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|h| h.to_str().ok())
        .expect("redirect must carry Location");

    assert!(location.starts_with("https://login.microsoftonline.com/"));
    assert!(location.contains("client_id=test-client-id"));
    assert!(location.contains("response_type=code"));
    assert!(location.contains("redirect_uri="));
    assert!(location.contains("scope="));
    assert!(location.contains("state="));
}

#[tokio::test]
async fn test_login_states_are_distinct() {
    let (app, _) = common::create_test_app();

    let mut states = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/microsoft/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|h| h.to_str().ok())
            .unwrap()
            .to_string();
        let state = location
            .split("state=")
            .nth(1)
            .unwrap_or_default()
            .to_string();
        assert!(!state.is_empty());
        states.push(state);
    }

    assert_ne!(states[0], states[1], "consecutive states must differ");
}

#[tokio::test]
async fn test_callback_missing_code_is_bad_request() {
    let (app, state) = common::create_test_app();

    // Use a genuinely issued state so the failure is about the code
    let oauth_state = state.oauth_states.issue().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/auth/microsoft/callback?state={oauth_state}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_callback_unknown_state_rejected() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/microsoft/callback?code=abc&state=never-issued")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_state_consumed_once() {
    let (app, state) = common::create_test_app();
    let oauth_state = state.oauth_states.issue().unwrap();

    // First callback consumes the state (and fails on the missing code)
    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/auth/microsoft/callback?state={oauth_state}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    // Replaying the same state must now be rejected outright
    let second = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/auth/microsoft/callback?code=abc&state={oauth_state}"
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_missing_state_rejected() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/microsoft/callback?code=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_provider_error_reported() {
    let (app, state) = common::create_test_app();
    let oauth_state = state.oauth_states.issue().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/auth/microsoft/callback?state={oauth_state}&error=access_denied"
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["details"]
        .as_str()
        .unwrap_or_default()
        .contains("access_denied"));
}
