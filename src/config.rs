// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup and held read-only for the process
//! lifetime. Missing required settings are fatal.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project / app ID the Firestore documents live under
    pub app_id: String,
    /// Base64-encoded service-account credentials JSON for Firestore
    pub firebase_config_json: String,

    /// Microsoft application (client) ID
    pub ms_client_id: String,
    /// Microsoft client secret
    pub ms_client_secret: String,
    /// Redirect URI registered for the OAuth callback
    pub ms_redirect_uri: String,
    /// Space-separated delegated scopes
    pub ms_scopes: String,
    /// Entra tenant ID
    pub ms_tenant_id: String,

    /// JWT signing key for session tokens (raw bytes)
    pub jwt_secret: Vec<u8>,

    /// Where the browser lands after a successful login
    pub frontend_success_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// The env names mirror the deployment manifests: the app/store pair
    /// uses the injected `__app_id` / `__firebase_config` bindings, the
    /// rest are plain `MS_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            app_id: require("__app_id")?,
            firebase_config_json: require("__firebase_config")?,

            ms_client_id: require("MS_APP_ID")?,
            ms_client_secret: require("MS_APP_SECRET")?,
            ms_redirect_uri: require("MS_REDIRECT_URI")?,
            ms_scopes: require("MS_SCOPES")?,
            ms_tenant_id: require("MS_TENANT_ID")?,

            jwt_secret: require("JWT_SECRET")?.into_bytes(),

            frontend_success_url: env::var("FRONTEND_SUCCESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000/auth/success".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            app_id: "test-project".to_string(),
            firebase_config_json: String::new(),
            ms_client_id: "test-client-id".to_string(),
            ms_client_secret: "test-client-secret".to_string(),
            ms_redirect_uri: "http://localhost:8080/auth/microsoft/callback".to_string(),
            ms_scopes: "openid profile User.Read Mail.Read".to_string(),
            ms_tenant_id: "common".to_string(),
            jwt_secret: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            frontend_success_url: "http://localhost:3000/auth/success".to_string(),
            port: 8080,
        }
    }
}

/// Read a required environment variable, trimming stray whitespace.
fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
