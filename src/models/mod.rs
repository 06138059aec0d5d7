// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod token;
pub mod user;

pub use token::OAuthToken;
pub use user::{UserProfile, UserRecord};
