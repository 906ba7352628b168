use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use crate::error_handling::types::StorageError;
use crate::storage::store_trait::AssetStore;
use crate::storage::types::{GifAsset, NewGifAsset, Visibility};

// Internal row mapping to avoid manual try_get
#[derive(Debug, sqlx::FromRow)]
struct GifRow {
    id: i64,
    filename: String,
    remote_url: String,
    size: i64,
    duration: Option<i64>,
    is_public: i64,
    created_at: String,
}

impl GifRow {
    fn into_asset(self) -> Result<GifAsset, StorageError> {
        Ok(GifAsset {
            id: self.id,
            filename: self.filename,
            remote_url: self.remote_url,
            size_bytes: self.size,
            duration_ms: self.duration,
            // 0/1 wire encoding stays confined to this adapter.
            visibility: Visibility::from_public_flag(self.is_public != 0),
            created_at: DateTime::parse_from_rfc3339(&self.created_at)
                .map_err(|_| StorageError::ReadFailed)?
                .with_timezone(&Utc),
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, filename, remote_url, size, duration, is_public, created_at FROM gifs";

/// SQLite-backed asset store.
pub struct DatabaseStore {
    pool: Pool<Sqlite>,
}

impl DatabaseStore {
    /// Create or open the database at the given path, creating the schema
    /// when missing.
    pub async fn new_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|_| StorageError::WriteFailed)?;
            }
        }
        let opts = SqliteConnectOptions::from_str("sqlite://")
            .map_err(|_| StorageError::ConnectionFailed)?
            .filename(path_ref)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(|_| StorageError::ConnectionFailed)?;
        Self::with_pool(pool).await
    }

    /// Private in-memory database, mainly for tests. Kept on a single
    /// connection so every query sees the same database.
    pub async fn new_memory() -> Result<Self, StorageError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|_| StorageError::ConnectionFailed)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|_| StorageError::ConnectionFailed)?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: Pool<Sqlite>) -> Result<Self, StorageError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS gifs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                remote_url TEXT NOT NULL,
                size INTEGER NOT NULL,
                duration INTEGER,
                is_public INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );",
        )
        .execute(&pool)
        .await
        .map_err(|_| StorageError::WriteFailed)?;
        Ok(Self { pool })
    }

    async fn insert_with_timestamp(
        &self,
        asset: &NewGifAsset,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        if !asset.validate() {
            return Err(StorageError::WriteFailed);
        }
        let result = sqlx::query(
            "INSERT INTO gifs (filename, remote_url, size, duration, is_public, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&asset.filename)
        .bind(&asset.remote_url)
        .bind(asset.size_bytes)
        .bind(asset.duration_ms)
        .bind(if asset.visibility.is_public() { 1i64 } else { 0i64 })
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|_| StorageError::WriteFailed)?;
        Ok(result.last_insert_rowid())
    }

    async fn fetch_list(&self, sql: &str) -> Result<Vec<GifAsset>, StorageError> {
        let rows: Vec<GifRow> = sqlx::query_as(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|_| StorageError::ReadFailed)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(row.into_asset()?);
        }
        Ok(out)
    }
}

#[async_trait]
impl AssetStore for DatabaseStore {
    async fn insert(&self, asset: NewGifAsset) -> Result<i64, StorageError> {
        self.insert_with_timestamp(&asset, Utc::now()).await
    }

    async fn list_public(&self) -> Result<Vec<GifAsset>, StorageError> {
        self.fetch_list(&format!(
            "{} WHERE is_public = 1 ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        ))
        .await
    }

    async fn list_all(&self) -> Result<Vec<GifAsset>, StorageError> {
        self.fetch_list(&format!(
            "{} ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        ))
        .await
    }

    async fn get_by_id(&self, id: i64) -> Result<GifAsset, StorageError> {
        let row: Option<GifRow> = sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| StorageError::ReadFailed)?;
        match row {
            Some(row) => row.into_asset(),
            None => Err(StorageError::NotFound),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM gifs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|_| StorageError::WriteFailed)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
