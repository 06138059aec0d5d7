// SPDX-License-Identifier: MIT

//! Firestore integration tests.
//!
//! These run only against the emulator (set FIRESTORE_EMULATOR_HOST);
//! otherwise they skip.

use mail_gateway::config::Config;
use mail_gateway::db::FirestoreDb;
use mail_gateway::models::{OAuthToken, UserRecord};

fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

macro_rules! require_emulator {
    () => {
        if !emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

async fn test_db() -> FirestoreDb {
    FirestoreDb::new(&Config::test_default())
        .await
        .expect("Failed to connect to Firestore emulator")
}

fn sample_record(id: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        display_name: "Test User".to_string(),
        email: "test@contoso.com".to_string(),
        login_time: chrono::Utc::now().to_rfc3339(),
        provider: "microsoft".to_string(),
        token: Some(OAuthToken::from_response(
            "access".to_string(),
            Some("refresh".to_string()),
            3600,
            Some("openid User.Read"),
        )),
        refresh_token: Some("gateway-refresh-jwt".to_string()),
    }
}

#[tokio::test]
async fn test_user_record_keyed_by_subject_id() {
    require_emulator!();
    let db = test_db().await;

    let record = sample_record("subject-integration-1");
    db.upsert_user(&record).await.expect("upsert should succeed");

    let stored = db
        .get_user("subject-integration-1")
        .await
        .expect("get should succeed")
        .expect("record should exist under the subject id");

    assert_eq!(stored.id, record.id);
    assert_eq!(stored.display_name, "Test User");
    assert_eq!(stored.provider, "microsoft");
}

#[tokio::test]
async fn test_login_overwrites_prior_record() {
    require_emulator!();
    let db = test_db().await;

    let mut record = sample_record("subject-integration-2");
    db.upsert_user(&record).await.unwrap();

    // A second login replaces the document wholesale
    record.display_name = "Renamed User".to_string();
    record.refresh_token = None;
    db.upsert_user(&record).await.unwrap();

    let stored = db
        .get_user("subject-integration-2")
        .await
        .unwrap()
        .expect("record should exist");

    assert_eq!(stored.display_name, "Renamed User");
    assert!(stored.refresh_token.is_none());
}

#[tokio::test]
async fn test_probe_succeeds_against_emulator() {
    require_emulator!();
    let db = test_db().await;

    db.probe().await.expect("probe should succeed");
}
