use serde::{Deserialize, Serialize};

use crate::storage::types::GifAsset;

/// `POST /gifs` success payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: i64,
    pub url: String,
    pub filename: String,
    pub size: i64,
    pub is_public: bool,
}

/// `GET /gifs` payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct GifListResponse {
    pub gifs: Vec<GifAsset>,
}

/// `GET /gifs/{id}` payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct GifResponse {
    pub gif: GifAsset,
}

/// `DELETE /gifs/{id}` success payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Query parameters of `GET /gifs`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// `all=true` (or `1`) includes private assets; administrative.
    pub all: Option<String>,
}
