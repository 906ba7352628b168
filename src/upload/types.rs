use serde::{Deserialize, Serialize};

/// What the remote store reports back for a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub remote_url: String,
    pub filename: String,
    pub size_bytes: i64,
}
