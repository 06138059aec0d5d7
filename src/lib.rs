// SPDX-License-Identifier: MIT

//! Mail-Gateway: Microsoft Graph OAuth gateway
//!
//! This crate provides the backend API for signing users in via the
//! Microsoft identity platform, fetching their Graph profile, and
//! persisting a user record to Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{GraphService, StateStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    /// App-only Graph client for backend-to-provider calls.
    pub graph: GraphService,
    /// Pending OAuth state values awaiting callback.
    pub oauth_states: StateStore,
}
