//! Persistence seams
//!
//! Two traits: [`PersistenceBackend`] for encrypted records and
//! [`KeyBackend`] for raw key material. Both implementations in this
//! module tree provide both, so one handle can back a whole store.

use async_trait::async_trait;

use crate::enums::IndexQuery;
use crate::error::Result;
use crate::models::PersistedRecord;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Key-value storage for records with secondary indexes on
/// `category` and `created_at`. Single-key atomicity only.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Insert or overwrite the record stored under `record.id`
    async fn put(&self, record: &PersistedRecord) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<PersistedRecord>>;

    async fn get_all_by_index(&self, query: &IndexQuery) -> Result<Vec<PersistedRecord>>;

    async fn get_all(&self) -> Result<Vec<PersistedRecord>>;

    /// Deleting an absent id is not an error
    async fn delete(&self, id: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Raw key material keyed by key id
#[async_trait]
pub trait KeyBackend: Send + Sync {
    async fn load_key(&self, key_id: &str) -> Result<Option<Vec<u8>>>;

    /// Store `bytes` only if nothing is stored yet; returns whatever is
    /// stored afterwards, so a losing racer sees the winner's key.
    async fn insert_key_if_absent(&self, key_id: &str, bytes: &[u8]) -> Result<Vec<u8>>;

    /// Overwrite in a single write
    async fn replace_key(&self, key_id: &str, bytes: &[u8]) -> Result<()>;

    async fn delete_key(&self, key_id: &str) -> Result<()>;
}
