// SPDX-License-Identifier: MIT

//! Services module - identity provider integration.

pub mod graph;
pub mod oauth_state;

pub use graph::{AuthMode, GraphService};
pub use oauth_state::StateStore;
