//! Remote object storage for encoded GIFs.
//!
//! The gateway pushes raw bytes to a blob-storage provider and returns the
//! public URL. Uploads are never retried here: the remote side gives no
//! idempotency guarantee for partial uploads, so failures surface to the
//! caller untouched.

pub mod gateway_trait;
pub mod http_gateway;
pub mod types;

#[cfg(test)]
pub mod mock_gateway;

pub use gateway_trait::UploadGateway;
pub use http_gateway::HttpUploadGateway;
pub use types::UploadReceipt;
