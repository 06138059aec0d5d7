// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod api;
pub mod auth;

use crate::middleware::auth::require_auth;
use crate::AppState;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyErrorResponse {
    pub status: String,
    pub error: String,
}

/// Liveness check - no dependencies, always 200.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness check - one trivial read against Firestore.
///
/// Any probe failure maps to 503 with the error detail; an empty result
/// set is still ready.
async fn ready_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ReadyErrorResponse>)> {
    match state.db.probe().await {
        Ok(()) => Ok(Json(HealthResponse {
            status: "ready".to_string(),
        })),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyErrorResponse {
                status: "unhealthy".to_string(),
                error: e.to_string(),
            }),
        )),
    }
}

/// Scheme + authority portion of a URL, e.g. "https://app.example.com"
/// out of "https://app.example.com/auth/success".
fn origin_of(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => {
            let authority = &url[scheme_end + 3..];
            match authority.find('/') {
                Some(path_start) => &url[..scheme_end + 3 + path_start],
                None => url,
            }
        }
        None => url,
    }
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS - allow the configured frontend's origin plus localhost for dev.
    // The success URL carries a path, so compare origins exactly; a prefix
    // match would admit look-alike registrable domains.
    let frontend_origin = origin_of(&state.config.frontend_success_url).to_string();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_origin
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/healthz", get(health_check))
        .route("/readyz", get(ready_check))
        .merge(auth::routes());

    // Mail API requires a valid session JWT
    let protected_routes =
        api::routes().route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of_strips_path() {
        assert_eq!(
            origin_of("https://app.example.com/auth/success"),
            "https://app.example.com"
        );
        assert_eq!(
            origin_of("http://localhost:3000/auth/success"),
            "http://localhost:3000"
        );
        assert_eq!(origin_of("https://app.example.com"), "https://app.example.com");
    }
}
