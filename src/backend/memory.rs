//! In-memory backend for tests and throwaway stores.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyBackend, PersistenceBackend};
use crate::enums::IndexQuery;
use crate::error::Result;
use crate::models::PersistedRecord;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<BTreeMap<String, PersistedRecord>>,
    keys: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn put(&self, record: &PersistedRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<PersistedRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn get_all_by_index(&self, query: &IndexQuery) -> Result<Vec<PersistedRecord>> {
        let guard = self.records.read().await;
        let matches = guard
            .values()
            .filter(|r| match query {
                IndexQuery::Category(c) => &r.category == c,
                IndexQuery::CreatedAt(ts) => r.created_at == *ts,
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn get_all(&self) -> Result<Vec<PersistedRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl KeyBackend for MemoryBackend {
    async fn load_key(&self, key_id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.keys.read().await.get(key_id).cloned())
    }

    async fn insert_key_if_absent(&self, key_id: &str, bytes: &[u8]) -> Result<Vec<u8>> {
        let mut guard = self.keys.write().await;
        let stored = guard
            .entry(key_id.to_string())
            .or_insert_with(|| bytes.to_vec());
        Ok(stored.clone())
    }

    async fn replace_key(&self, key_id: &str, bytes: &[u8]) -> Result<()> {
        self.keys
            .write()
            .await
            .insert(key_id.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn delete_key(&self, key_id: &str) -> Result<()> {
        self.keys.write().await.remove(key_id);
        Ok(())
    }
}
