//! In-memory asset store.
//!
//! Drop-in substitute for [`DatabaseStore`](crate::storage::DatabaseStore)
//! with the same ordering and validation semantics, used by route tests and
//! anywhere a throwaway store is handy.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error_handling::types::StorageError;
use crate::storage::store_trait::AssetStore;
use crate::storage::types::{GifAsset, NewGifAsset};

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    rows: Vec<GifAsset>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert_with_timestamp(
        &self,
        asset: &NewGifAsset,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        if !asset.validate() {
            return Err(StorageError::WriteFailed);
        }
        let mut inner = self.inner();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.rows.push(GifAsset {
            id,
            filename: asset.filename.clone(),
            remote_url: asset.remote_url.clone(),
            size_bytes: asset.size_bytes,
            duration_ms: asset.duration_ms,
            visibility: asset.visibility,
            created_at,
        });
        Ok(id)
    }

    fn sorted(mut rows: Vec<GifAsset>) -> Vec<GifAsset> {
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        rows
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn insert(&self, asset: NewGifAsset) -> Result<i64, StorageError> {
        self.insert_with_timestamp(&asset, Utc::now())
    }

    async fn list_public(&self) -> Result<Vec<GifAsset>, StorageError> {
        let rows = self.inner().rows.clone();
        Ok(Self::sorted(
            rows.into_iter()
                .filter(|a| a.visibility.is_public())
                .collect(),
        ))
    }

    async fn list_all(&self) -> Result<Vec<GifAsset>, StorageError> {
        Ok(Self::sorted(self.inner().rows.clone()))
    }

    async fn get_by_id(&self, id: i64) -> Result<GifAsset, StorageError> {
        self.inner()
            .rows
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StorageError> {
        let mut inner = self.inner();
        let before = inner.rows.len();
        inner.rows.retain(|a| a.id != id);
        if inner.rows.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
