//! Master key lifecycle
//!
//! States per key id are `Absent` and `Present`. Generation and import move
//! to `Present`, deletion moves back to `Absent`. Nothing here touches
//! stored records: deleting a key crypto-shreds whatever it encrypted.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::KeyBackend;
use crate::key_ops::{generate_key, key_from_bytes, Key, PortableKey};
use crate::error::Result;

pub struct KeyManager {
    backend: Arc<dyn KeyBackend>,
    // one creation lock per key id
    creation_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyManager {
    pub fn new(backend: Arc<dyn KeyBackend>) -> Self {
        Self {
            backend,
            creation_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn creation_lock(&self, key_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.creation_locks.lock().await;
        locks
            .entry(key_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Return the key stored under `key_id`, generating and persisting a
    /// fresh one on first use. Concurrent first callers all receive the
    /// single key that ends up persisted.
    pub async fn get_or_create_key(&self, key_id: &str) -> Result<Key> {
        if let Some(bytes) = self.backend.load_key(key_id).await? {
            return key_from_bytes(&bytes);
        }

        let lock = self.creation_lock(key_id).await;
        let _guard = lock.lock().await;

        // another caller may have won while we waited
        if let Some(bytes) = self.backend.load_key(key_id).await? {
            return key_from_bytes(&bytes);
        }

        let fresh = generate_key();
        let stored = self
            .backend
            .insert_key_if_absent(key_id, fresh.expose_secret())
            .await?;
        if stored.as_slice() != fresh.expose_secret().as_slice() {
            warn!(key_id, "key created concurrently elsewhere, adopting stored key");
        } else {
            info!(key_id, "generated new master key");
        }
        key_from_bytes(&stored)
    }

    /// Look up an existing key without creating one
    pub async fn get_key(&self, key_id: &str) -> Result<Option<Key>> {
        match self.backend.load_key(key_id).await? {
            Some(bytes) => Ok(Some(key_from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    pub async fn has_key(&self, key_id: &str) -> Result<bool> {
        Ok(self.backend.load_key(key_id).await?.is_some())
    }

    /// Archivable descriptor for the key, or `None` when absent
    pub async fn export_key(&self, key_id: &str) -> Result<Option<PortableKey>> {
        let key = self.get_key(key_id).await?;
        Ok(key.as_ref().map(PortableKey::from_key))
    }

    /// Replace the key under `key_id`. The descriptor is fully validated
    /// before anything is written, so a bad import leaves the old key.
    pub async fn import_key(&self, key_id: &str, portable: &PortableKey) -> Result<()> {
        let key = portable.to_key()?;

        let lock = self.creation_lock(key_id).await;
        let _guard = lock.lock().await;
        self.backend
            .replace_key(key_id, key.expose_secret())
            .await?;
        info!(key_id, "imported master key");
        Ok(())
    }

    /// Irreversible. Records encrypted under this key stay in place but can
    /// no longer be decrypted.
    pub async fn delete_key(&self, key_id: &str) -> Result<()> {
        let lock = self.creation_lock(key_id).await;
        let _guard = lock.lock().await;
        self.backend.delete_key(key_id).await?;
        debug!(key_id, "deleted master key");
        Ok(())
    }
}
