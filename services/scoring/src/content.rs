//! Content-addressable storage seam
//!
//! The engine reads source artifacts and writes reports through this trait.
//! Ids are derived from content, so blobs are immutable and a put of the
//! same bytes is idempotent. Production deployments plug an external blob
//! store in here; tests and the default wiring use the in-memory one.

use async_trait::async_trait;
use dashmap::DashMap;
use types::ids::ContentId;

use crate::errors::ContentStoreError;

/// Addressable blob storage.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a blob, returning its content id.
    async fn put(&self, bytes: Vec<u8>) -> Result<ContentId, ContentStoreError>;

    /// Fetch a blob by id. `Ok(None)` means the id is unknown — a domain
    /// condition, not a transport failure.
    async fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, ContentStoreError>;
}

/// In-memory content-addressed store.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blobs: DashMap<ContentId, Vec<u8>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<ContentId, ContentStoreError> {
        let id = ContentId::from_bytes(&bytes);
        self.blobs.insert(id.clone(), bytes);
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, ContentStoreError> {
        Ok(self.blobs.get(id).map(|b| b.clone()))
    }
}
