//! Records describing uploaded GIFs.

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Whether an asset appears in the public gallery or is reachable only by
/// direct link.
///
/// The enum is the storage-boundary type; the 0/1 integer encoding lives
/// only inside the persistence adapter, and JSON sees a plain bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }

    pub fn from_public_flag(public: bool) -> Self {
        if public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_public())
    }
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer).map(Visibility::from_public_flag)
    }
}

/// A persisted record of an uploaded artifact.
///
/// `id` and `created_at` are assigned by the store at insertion and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifAsset {
    pub id: i64,
    pub filename: String,
    pub remote_url: String,
    #[serde(rename = "size")]
    pub size_bytes: i64,
    #[serde(rename = "duration")]
    pub duration_ms: Option<i64>,
    #[serde(rename = "is_public")]
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when persisting a new asset.
#[derive(Debug, Clone)]
pub struct NewGifAsset {
    pub filename: String,
    pub remote_url: String,
    pub size_bytes: i64,
    pub duration_ms: Option<i64>,
    pub visibility: Visibility,
}

impl NewGifAsset {
    /// A row is writable only with a positive size and an absolute URL.
    pub fn validate(&self) -> bool {
        self.size_bytes > 0
            && (self.remote_url.starts_with("http://") || self.remote_url.starts_with("https://"))
    }
}
