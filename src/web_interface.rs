//! HTTP surface: the upload endpoint and the gallery read API.

pub mod routes;
pub mod types;
pub mod web_server;

use serde::{Deserialize, Serialize};

pub use web_server::WebServer;

/// API error payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}
