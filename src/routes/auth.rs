// SPDX-License-Identifier: MIT

//! Microsoft OAuth authentication routes.
//!
//! The callback runs the whole login sequence in order: state check, code
//! check, code-for-token exchange, profile fetch, session minting,
//! Firestore write, redirect. Any failure aborts the attempt; nothing is
//! retried and nothing is rolled back.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_refresh_token, create_session_token, SESSION_COOKIE};
use crate::models::UserRecord;
use crate::services::GraphService;
use crate::AppState;

/// Session cookie lifetime (48h, outliving the 24h JWT inside it).
const SESSION_COOKIE_MAX_AGE_SECS: i64 = 2 * 24 * 60 * 60;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/microsoft/login", get(login))
        .route("/auth/microsoft/callback", get(callback))
}

/// Start the login flow: issue a state value and redirect to the
/// provider's authorization endpoint.
async fn login(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let oauth_state = state.oauth_states.issue()?;
    let auth_url = state.graph.authorization_url(&oauth_state);

    tracing::info!("Starting OAuth flow, redirecting to Microsoft");

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth callback: exchange the code, fetch the profile, persist the user
/// record, and hand the browser a session cookie.
async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    // Provider-reported error ends the attempt before anything else
    if let Some(error) = params.error {
        let detail = params.error_description.unwrap_or_default();
        tracing::warn!(error = %error, detail = %detail, "OAuth error from provider");
        return Err(AppError::BadRequest(format!(
            "provider returned error: {}",
            error
        )));
    }

    // The state must be one we issued, unconsumed and unexpired
    let returned_state = params.state.unwrap_or_default();
    if !state.oauth_states.consume(&returned_state) {
        tracing::warn!("Rejected callback with unknown or expired state");
        return Err(AppError::Unauthorized);
    }

    let code = match params.code.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => return Err(AppError::BadRequest("missing code".to_string())),
    };

    // Exchange the code for a provider token (single attempt)
    let token = state.graph.exchange_code(code).await?;

    // Fetch the profile with a delegated client around the new token
    let delegated = GraphService::delegated(&state.config, &token);
    let profile = delegated.get_me().await?;

    tracing::info!(
        user_id = %profile.id,
        "OAuth successful, profile fetched"
    );

    // Mint gateway tokens
    let session_token = create_session_token(&profile.id, &state.config.jwt_secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))?;
    let refresh_token = create_refresh_token(&profile.id, &state.config.jwt_secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Refresh token creation failed: {}", e)))?;

    // Persist the user record, fully overwriting any prior login
    let record = UserRecord {
        id: profile.id.clone(),
        display_name: profile.display_name.clone().unwrap_or_default(),
        email: profile.email(),
        login_time: chrono::Utc::now().to_rfc3339(),
        provider: "microsoft".to_string(),
        token: Some(token),
        refresh_token: Some(refresh_token),
    };
    state.db.upsert_user(&record).await?;

    tracing::info!(user_id = %record.id, "User record stored, login complete");

    let jar = jar.add(session_cookie(&state, session_token));

    Ok((jar, Redirect::temporary(&state.config.frontend_success_url)))
}

/// Build the session cookie. Secure is set only when the frontend is
/// served over https, so local http development still works.
fn session_cookie(state: &AppState, session_token: String) -> Cookie<'static> {
    let secure = state.config.frontend_success_url.starts_with("https://");

    Cookie::build((SESSION_COOKIE, session_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_COOKIE_MAX_AGE_SECS))
        .build()
}
