// SPDX-License-Identifier: MIT

//! Microsoft identity platform + Graph API client.
//!
//! Handles:
//! - Authorization URL construction for the code flow
//! - Code-for-token exchange (single attempt, bounded timeout)
//! - Client-credentials token acquisition for app-only calls
//! - Graph queries (`/me`, `/me/messages`, `/users/{id}`)

use crate::config::Config;
use crate::error::AppError;
use crate::models::{OAuthToken, UserProfile};
use serde::Deserialize;
use std::time::Duration;

/// Timeout applied to every outbound provider call. No retries: a failed
/// call aborts the login attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Scope used for client-credentials (app-only) tokens.
const APP_ONLY_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Which OAuth flow a client was constructed for.
///
/// Operations invalid for the mode are refused locally instead of letting
/// the provider fail with an opaque error.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Client-credentials token, not tied to any user.
    AppOnly,
    /// Acting as one consenting user via their access token.
    Delegated { access_token: String },
}

/// Low-level Microsoft endpoints client.
#[derive(Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    login_base_url: String,
    graph_base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: String,
    tenant_id: String,
}

impl GraphClient {
    /// Create a new client from the provider credentials in config.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            login_base_url: "https://login.microsoftonline.com".to_string(),
            graph_base_url: "https://graph.microsoft.com/v1.0".to_string(),
            client_id: config.ms_client_id.clone(),
            client_secret: config.ms_client_secret.clone(),
            redirect_uri: config.ms_redirect_uri.clone(),
            scopes: config.ms_scopes.clone(),
            tenant_id: config.ms_tenant_id.clone(),
        }
    }

    /// Build the tenant's authorization endpoint URL for the given state.
    ///
    /// Pure construction; the caller stores the state and issues the
    /// redirect.
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/authorize?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             response_mode=query&\
             scope={}&\
             state={}",
            self.login_base_url,
            self.tenant_id,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scopes),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for a token set.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthToken, AppError> {
        let url = format!("{}/{}/oauth2/v2.0/token", self.login_base_url, self.tenant_id);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scopes.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Exchange(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Token exchange rejected");
            return Err(AppError::Exchange(format!(
                "Token endpoint returned status {}",
                status
            )));
        }

        let wire: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Exchange(format!("Unparseable token response: {}", e)))?;

        Ok(OAuthToken::from_response(
            wire.access_token,
            wire.refresh_token,
            wire.expires_in,
            wire.scope.as_deref(),
        ))
    }

    /// Acquire an app-only token via the client-credentials grant.
    ///
    /// Client-credentials requires the `.default` scope format.
    pub async fn acquire_app_token(&self) -> Result<OAuthToken, AppError> {
        let url = format!("{}/{}/oauth2/v2.0/token", self.login_base_url, self.tenant_id);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", APP_ONLY_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| AppError::GraphApi(format!("App token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GraphApi(format!(
                "App token endpoint returned status {}: {}",
                status, body
            )));
        }

        let wire: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::GraphApi(format!("Unparseable app token response: {}", e)))?;

        Ok(OAuthToken::from_response(
            wire.access_token,
            wire.refresh_token,
            wire.expires_in,
            wire.scope.as_deref(),
        ))
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::GraphApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GraphApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GraphApi(format!("JSON parse error: {}", e)))
    }
}

/// Token endpoint wire response.
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    scope: Option<String>,
}

/// Message list page from Graph.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct MessagePage {
    #[serde(rename = "value")]
    pub messages: Vec<serde_json::Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphService - mode-aware service over the raw client
// ─────────────────────────────────────────────────────────────────────────────

/// High-level Graph service tracking its authentication mode.
///
/// The process holds one long-lived app-only instance; a short-lived
/// delegated instance is built per login callback around the user's token.
#[derive(Clone)]
pub struct GraphService {
    client: GraphClient,
    mode: AuthMode,
}

impl GraphService {
    /// Create an app-only service (client-credentials flow).
    pub fn app_only(config: &Config) -> Self {
        Self {
            client: GraphClient::new(config),
            mode: AuthMode::AppOnly,
        }
    }

    /// Create a service acting as a specific user.
    pub fn delegated(config: &Config, token: &OAuthToken) -> Self {
        Self {
            client: GraphClient::new(config),
            mode: AuthMode::Delegated {
                access_token: token.access_token.clone(),
            },
        }
    }

    /// Whether this instance acts on behalf of a user.
    pub fn is_delegated(&self) -> bool {
        matches!(self.mode, AuthMode::Delegated { .. })
    }

    /// Build the authorization URL for the given state (mode-independent).
    pub fn authorization_url(&self, state: &str) -> String {
        self.client.authorization_url(state)
    }

    /// Exchange an authorization code for a token set (mode-independent).
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthToken, AppError> {
        self.client.exchange_code(code).await
    }

    /// The user's delegated access token, or a descriptive refusal.
    fn delegated_token(&self, operation: &str) -> Result<&str, AppError> {
        match &self.mode {
            AuthMode::Delegated { access_token } => Ok(access_token),
            AuthMode::AppOnly => Err(AppError::ProfileFetch(format!(
                "{} is only valid with the delegated authentication flow, \
                 not client credentials",
                operation
            ))),
        }
    }

    /// Fetch the current user's profile via `/me`.
    ///
    /// Refused locally in app-only mode: a client-credentials token has no
    /// notion of a current user.
    pub async fn get_me(&self) -> Result<UserProfile, AppError> {
        let token = self.delegated_token("/me")?;
        let url = format!("{}/me", self.client.graph_base_url);
        self.client
            .get_json(&url, token)
            .await
            .map_err(|e| match e {
                AppError::GraphApi(msg) => AppError::ProfileFetch(msg),
                other => other,
            })
    }

    /// List the current user's messages via `/me/messages` (delegated only).
    pub async fn list_messages(&self) -> Result<MessagePage, AppError> {
        let token = self.delegated_token("/me/messages")?;
        let url = format!("{}/me/messages", self.client.graph_base_url);
        self.client.get_json(&url, token).await
    }

    /// Look up a directory user by ID (app-only, client credentials).
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<UserProfile, AppError> {
        let token = self.client.acquire_app_token().await?;
        let url = format!(
            "{}/users/{}",
            self.client.graph_base_url,
            urlencoding::encode(user_id)
        );
        self.client.get_json(&url, &token.access_token).await
    }

    /// Send mail as the authenticated user.
    pub async fn send_mail(
        &self,
        _subject: &str,
        _body: &str,
        _to_recipients: &[String],
    ) -> Result<(), AppError> {
        // TODO: build the Graph sendMail payload (message + toRecipients)
        // and POST it to /me/sendMail.
        Err(AppError::GraphApi(
            "send_mail is not implemented yet".to_string(),
        ))
    }
}
