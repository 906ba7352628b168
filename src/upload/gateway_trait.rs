//! The upload contract consumed by the web layer.

use async_trait::async_trait;

use crate::error_handling::types::UploadError;
use crate::upload::types::UploadReceipt;

#[async_trait]
pub trait UploadGateway: Send + Sync {
    /// Pushes the bytes to remote object storage under a name derived from
    /// `filename_hint`.
    ///
    /// Fails with [`UploadError::UploadFailed`] for any network, auth or
    /// remote-quota error. Implementations must not retry: partial uploads
    /// are not idempotent on the remote side.
    async fn upload(&self, bytes: &[u8], filename_hint: &str)
        -> Result<UploadReceipt, UploadError>;
}
