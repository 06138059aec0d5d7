// SPDX-License-Identifier: MIT

//! Provider-issued OAuth token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credential set obtained from the token endpoint.
///
/// Held transiently during login; a copy goes into the persisted
/// [`UserRecord`](crate::models::UserRecord).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Access token for Graph calls
    pub access_token: String,
    /// Refresh token, present only when offline_access was granted
    pub refresh_token: Option<String>,
    /// Absolute expiry (ISO 8601)
    pub expires_at: String,
    /// Granted OAuth scopes
    pub scopes: Vec<String>,
}

impl OAuthToken {
    /// Build a token from the wire response, converting the relative
    /// `expires_in` seconds into an absolute timestamp.
    pub fn from_response(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
        scope: Option<&str>,
    ) -> Self {
        let expires_at = (Utc::now() + Duration::seconds(expires_in)).to_rfc3339();
        Self {
            access_token,
            refresh_token,
            expires_at,
            scopes: scope
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Whether the token has already expired.
    pub fn is_expired(&self) -> bool {
        DateTime::parse_from_rfc3339(&self.expires_at)
            .map(|dt| dt.with_timezone(&Utc) <= Utc::now())
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_absolute_expiry() {
        let token = OAuthToken::from_response(
            "access".to_string(),
            Some("refresh".to_string()),
            3600,
            Some("openid User.Read"),
        );

        assert!(!token.is_expired());
        assert_eq!(token.scopes, vec!["openid", "User.Read"]);
    }

    #[test]
    fn test_expired_token() {
        let token = OAuthToken::from_response("access".to_string(), None, -10, None);
        assert!(token.is_expired());
        assert!(token.scopes.is_empty());
    }
}
