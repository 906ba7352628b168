//! Blob-storage client speaking the provider's multipart upload API.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error};
use serde::Deserialize;

use crate::error_handling::types::UploadError;
use crate::upload::gateway_trait::UploadGateway;
use crate::upload::types::UploadReceipt;

#[derive(Debug, Deserialize)]
struct RemoteData {
    url: String,
    filename: String,
}

#[derive(Debug, Deserialize)]
struct RemoteResponse {
    data: RemoteData,
}

/// Uploads via `POST {endpoint}` with an API-key header, multipart field
/// `file` plus an optional `domain` field selecting the serving domain.
/// The provider answers `{"data": {"url", "filename"}}`.
pub struct HttpUploadGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    domain: Option<String>,
}

impl HttpUploadGateway {
    pub fn new(endpoint: String, api_key: String, domain: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            domain,
        }
    }
}

/// Derives the stored object name from a caller hint: keeps a name that
/// already ends in `.gif`, otherwise stamps a unique one.
pub fn object_filename(hint: &str) -> String {
    let trimmed = hint.trim();
    if !trimmed.is_empty() && trimmed.ends_with(".gif") {
        return trimmed.to_string();
    }
    if trimmed.is_empty() {
        format!("webcam-gif-{}.gif", Utc::now().timestamp_millis())
    } else {
        format!("{}.gif", trimmed)
    }
}

/// Converts a direct object URL on the provider domain to its display form
/// (`https://host/file.gif` -> `https://host/r/file.gif`). URLs on other
/// hosts pass through unchanged.
pub fn display_url(direct_url: &str, provider_domain: &str) -> String {
    match reqwest::Url::parse(direct_url) {
        Ok(url) if url.host_str().is_some_and(|h| h.ends_with(provider_domain)) => {
            let path = url.path();
            if path.starts_with("/r/") {
                direct_url.to_string()
            } else {
                format!(
                    "{}://{}/r{}",
                    url.scheme(),
                    url.host_str().unwrap_or_default(),
                    path
                )
            }
        }
        _ => direct_url.to_string(),
    }
}

/// Inverse of [`display_url`].
pub fn direct_url(display_url: &str, provider_domain: &str) -> String {
    match reqwest::Url::parse(display_url) {
        Ok(url) if url.host_str().is_some_and(|h| h.ends_with(provider_domain)) => {
            display_url.replacen("/r/", "/", 1)
        }
        _ => display_url.to_string(),
    }
}

#[async_trait]
impl UploadGateway for HttpUploadGateway {
    async fn upload(
        &self,
        bytes: &[u8],
        filename_hint: &str,
    ) -> Result<UploadReceipt, UploadError> {
        let filename = object_filename(filename_hint);
        let size_bytes = bytes.len() as i64;
        debug!("uploading {} ({} bytes)", filename, size_bytes);

        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(filename.clone())
            .mime_str("image/gif")
            .map_err(|e| UploadError::UploadFailed(e.to_string()))?;
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(domain) = &self.domain {
            form = form.text("domain", domain.clone());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("upload request failed: {}", e);
                UploadError::UploadFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("remote store rejected {}: {}", filename, status);
            return Err(UploadError::UploadFailed(format!(
                "remote store returned {}",
                status
            )));
        }

        let body: RemoteResponse = response
            .json()
            .await
            .map_err(|e| UploadError::UploadFailed(e.to_string()))?;
        Ok(UploadReceipt {
            remote_url: body.data.url,
            filename: body.data.filename,
            size_bytes,
        })
    }
}
