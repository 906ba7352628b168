//! Asset Store Trait
//!
//! This module defines the `AssetStore` trait, the interface for persisted
//! GIF metadata backends.
//!
//! Implementors of this trait are responsible for:
//! - Atomically inserting new asset rows
//! - Answering gallery queries in newest-first order
//! - Looking up and deleting single rows by id
//!
//! All methods return a `Result` to handle potential storage errors. The
//! handle is constructed once at startup and injected as `Arc<dyn
//! AssetStore>`, which keeps callers testable with an in-memory substitute.

use async_trait::async_trait;

use crate::error_handling::types::StorageError;
use crate::storage::types::{GifAsset, NewGifAsset};

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persists a new asset as a single atomic row insert and returns the
    /// assigned id. Rejects rows that fail [`NewGifAsset::validate`].
    async fn insert(&self, asset: NewGifAsset) -> Result<i64, StorageError>;

    /// All public assets, newest first (ties broken by insertion order).
    async fn list_public(&self) -> Result<Vec<GifAsset>, StorageError>;

    /// Every asset regardless of visibility, newest first. Administrative.
    async fn list_all(&self) -> Result<Vec<GifAsset>, StorageError>;

    /// Fails with [`StorageError::NotFound`] for an unknown id.
    async fn get_by_id(&self, id: i64) -> Result<GifAsset, StorageError>;

    /// Removes exactly one row. The remote object is intentionally left
    /// untouched; an orphaned remote file is the accepted trade-off.
    async fn delete_by_id(&self, id: i64) -> Result<(), StorageError>;
}
