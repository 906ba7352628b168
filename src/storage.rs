//! Persisted GIF assets and the storage backends that hold them.

pub mod database_store;
pub mod memory_store;
pub mod store_trait;
pub mod types;

pub use database_store::DatabaseStore;
pub use memory_store::MemoryStore;
pub use store_trait::AssetStore;
pub use types::{GifAsset, NewGifAsset, Visibility};
