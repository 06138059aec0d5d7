// SPDX-License-Identifier: MIT

//! User models for storage and API.

use crate::models::OAuthToken;
use serde::{Deserialize, Serialize};

/// Current-user profile as returned by Graph `/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable subject identifier issued by the provider
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    /// Primary email; Graph leaves this unset for some account types
    pub mail: Option<String>,
    #[serde(rename = "userPrincipalName")]
    pub user_principal_name: Option<String>,
}

impl UserProfile {
    /// Best-effort email address: `mail`, falling back to the UPN.
    pub fn email(&self) -> String {
        self.mail
            .clone()
            .or_else(|| self.user_principal_name.clone())
            .unwrap_or_default()
    }
}

/// User record stored in Firestore, keyed by the subject identifier.
///
/// Field names match the persisted document shape; the record is fully
/// overwritten on every successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub display_name: String,
    pub email: String,
    /// When this login completed (ISO 8601)
    pub login_time: String,
    /// Identity provider name, currently always "microsoft"
    pub provider: String,
    /// Provider token set obtained at login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<OAuthToken>,
    /// Gateway-issued refresh JWT
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_falls_back_to_upn() {
        let profile = UserProfile {
            id: "abc".to_string(),
            display_name: Some("Test User".to_string()),
            mail: None,
            user_principal_name: Some("test@contoso.com".to_string()),
        };
        assert_eq!(profile.email(), "test@contoso.com");

        let profile = UserProfile {
            id: "abc".to_string(),
            display_name: None,
            mail: Some("mail@contoso.com".to_string()),
            user_principal_name: Some("upn@contoso.com".to_string()),
        };
        assert_eq!(profile.email(), "mail@contoso.com");
    }

    #[test]
    fn test_user_record_document_shape() {
        let record = UserRecord {
            id: "subject-1".to_string(),
            display_name: "Test User".to_string(),
            email: "test@contoso.com".to_string(),
            login_time: "2026-01-01T00:00:00Z".to_string(),
            provider: "microsoft".to_string(),
            token: None,
            refresh_token: Some("jwt".to_string()),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["displayName"], "Test User");
        assert_eq!(value["loginTime"], "2026-01-01T00:00:00Z");
        assert_eq!(value["refreshToken"], "jwt");
        assert_eq!(value["provider"], "microsoft");
        // Absent token must not serialize as null
        assert!(value.get("token").is_none());
    }
}
