// SPDX-License-Identifier: MIT

use mail_gateway::config::Config;
use mail_gateway::db::FirestoreDb;
use mail_gateway::routes::create_router;
use mail_gateway::services::{GraphService, StateStore};
use mail_gateway::AppState;
use std::sync::Arc;

/// Create a test app with an offline mock database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_frontend_url("http://localhost:3000/auth/success")
}

/// Create a test app with a specific frontend success URL.
#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_success_url = frontend_url.to_string();

    let db = FirestoreDb::new_mock();
    let graph = GraphService::app_only(&config);

    let state = Arc::new(AppState {
        config,
        db,
        graph,
        oauth_states: StateStore::new(),
    });

    (create_router(state.clone()), state)
}
