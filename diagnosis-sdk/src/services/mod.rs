//! Clients for the kiosk backend
//!
//! This module contains the REST client and the history and health
//! collaborators built on it.

mod api;
mod common;
pub mod health;
pub mod history;

pub use api::ApiClient;
pub use common::{UserAgent, REQUEST_ID_HEADER};
pub use health::{ConnectionStatus, HealthProbe};
pub use history::HistoryClient;
