// SPDX-License-Identifier: MIT

//! Mail API routes (require a session JWT).
//!
//! These are thin pass-throughs over the Graph client. The process-wide
//! client is app-only, so delegated-only operations surface the
//! descriptive wrong-mode error instead of an opaque provider failure.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::UserProfile;
use crate::services::graph::MessagePage;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Mail API routes. The auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/mail/microsoft/user", get(get_user_info))
        .route("/api/mail/microsoft/messages", get(get_messages))
        .route("/api/mail/microsoft/send", post(send_mail))
}

/// Look up the authenticated user in the directory (app-only call).
async fn get_user_info(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state.graph.get_user_by_id(&user.user_id).await?;
    Ok(Json(profile))
}

/// List the current user's messages.
///
/// `/me/messages` needs a delegated token; the shared app-only client
/// refuses it locally.
async fn get_messages(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<MessagePage>> {
    let page = state.graph.list_messages().await?;
    Ok(Json(page))
}

/// Send-mail request body.
#[derive(Debug, Deserialize)]
pub struct SendMailRequest {
    pub subject: String,
    pub body: String,
    pub to_recipients: Vec<String>,
}

/// Placeholder response for send-mail (never reached today).
#[derive(Serialize)]
pub struct SendMailResponse {
    pub success: bool,
}

/// Send mail as the authenticated user. Not implemented yet; always
/// returns an error.
async fn send_mail(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Json(request): Json<SendMailRequest>,
) -> Result<Json<SendMailResponse>> {
    state
        .graph
        .send_mail(&request.subject, &request.body, &request.to_recipients)
        .await?;
    Ok(Json(SendMailResponse { success: true }))
}
