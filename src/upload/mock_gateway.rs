//! Recording stub gateway for tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error_handling::types::UploadError;
use crate::upload::gateway_trait::UploadGateway;
use crate::upload::http_gateway::object_filename;
use crate::upload::types::UploadReceipt;

pub struct MockUploadGateway {
    fail: bool,
    calls: Mutex<Vec<(i64, String)>>,
}

impl MockUploadGateway {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A gateway whose every upload fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> MutexGuard<'_, Vec<(i64, String)>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// `(size_bytes, stored filename)` per successful call, in order.
    pub fn recorded_calls(&self) -> Vec<(i64, String)> {
        self.calls().clone()
    }
}

#[async_trait]
impl UploadGateway for MockUploadGateway {
    async fn upload(
        &self,
        bytes: &[u8],
        filename_hint: &str,
    ) -> Result<UploadReceipt, UploadError> {
        if self.fail {
            return Err(UploadError::UploadFailed("mock upload failure".into()));
        }
        let filename = object_filename(filename_hint);
        let size_bytes = bytes.len() as i64;
        self.calls().push((size_bytes, filename.clone()));
        Ok(UploadReceipt {
            remote_url: format!("https://cdn.example.com/{}", filename),
            filename,
            size_bytes,
        })
    }
}
