use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    BadIPFormatting(String),
    NotInRange(String),
    MissingValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BadIPFormatting(e) => write!(f, "IP formatting error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
            ConfigError::MissingValue(e) => write!(f, "Missing configuration value: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failures of the capture pipeline: camera acquisition, frame delivery and
/// GIF encoding. Stored on the recording session as `last_error`, never
/// propagated across the state machine boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    PermissionDenied(String),
    DeviceUnavailable(String),
    EncodingFailed(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::PermissionDenied(e) => write!(f, "Camera access denied: {}", e),
            CaptureError::DeviceUnavailable(e) => write!(f, "Camera unavailable: {}", e),
            CaptureError::EncodingFailed(e) => write!(f, "GIF encoding failed: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    ConnectionFailed,
    WriteFailed,
    ReadFailed,
    NotFound,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionFailed => write!(f, "Storage connection failed"),
            StorageError::WriteFailed => write!(f, "Storage write failed"),
            StorageError::ReadFailed => write!(f, "Storage read failed"),
            StorageError::NotFound => write!(f, "Record not found"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Remote object-storage failures. Uploads are never retried automatically;
/// the remote side gives no idempotency guarantee for partial uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    UploadFailed(String),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::UploadFailed(e) => write!(f, "Upload failed: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

#[derive(Debug)]
pub enum WebError {
    BindFailed(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BindFailed(e) => write!(f, "Web server bind failed: {}", e),
        }
    }
}

impl std::error::Error for WebError {}
