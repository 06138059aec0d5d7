// SPDX-License-Identifier: MIT

//! Session JWT issuing and verification.
//!
//! Tokens carry the Graph subject identifier as `sub`. The session token
//! lives 24 hours, the refresh token 7 days; both are HS256 over the
//! configured signing secret.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session token validity window (24 hours).
pub const SESSION_TOKEN_TTL_SECS: usize = 24 * 60 * 60;

/// Refresh token validity window (7 days).
pub const REFRESH_TOKEN_TTL_SECS: usize = 7 * 24 * 60 * 60;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (Graph user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from a session JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Middleware that requires a valid session JWT.
///
/// Accepts the session cookie first, then an `Authorization: Bearer`
/// header.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let claims =
        verify_token(&token, &state.config.jwt_secret).map_err(|_| AppError::InvalidToken)?;

    let auth_user = AuthUser {
        user_id: claims.sub,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Decode and validate a JWT, returning its claims.
pub fn verify_token(token: &str, signing_key: &[u8]) -> anyhow::Result<Claims> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}

/// Create the short-lived session JWT for a user.
pub fn create_session_token(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    create_token(user_id, signing_key, SESSION_TOKEN_TTL_SECS)
}

/// Create the longer-lived refresh JWT for a user.
pub fn create_refresh_token(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    create_token(user_id, signing_key, REFRESH_TOKEN_TTL_SECS)
}

fn create_token(user_id: &str, signing_key: &[u8], ttl_secs: usize) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    if signing_key.is_empty() {
        anyhow::bail!("JWT signing key is empty");
    }

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
