//! Encrypted diary store
//!
//! Ties together the persistence backend, the key manager and the codec.
//! Writes encrypt everything before a single `put`; reads decrypt on the
//! way out. Records are never updated in place.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::backup::BackupSink;
use crate::consts::{DEFAULT_KEY_ID, MAX_BACKUP_BLOB_BYTES};
use crate::core::crypto::{decrypt_from_str, encrypt_to_string};
use crate::core::util::{hash_commitment, new_entry_id, now_millis, validate_category};
use crate::enums::IndexQuery;
use crate::error::{CoreError, Result};
use crate::export::json::ExportBundle;
use crate::key_manager::KeyManager;
use crate::key_ops::Key;
use crate::models::{BackupMetadata, BackupReceipt, DiaryEntry, PersistedRecord};

pub struct EntryStore {
    backend: Arc<dyn PersistenceBackend>,
    keys: Arc<KeyManager>,
    key_id: String,
    max_backup_bytes: usize,
}

impl EntryStore {
    /// Store using the default key id
    pub fn new(backend: Arc<dyn PersistenceBackend>, keys: Arc<KeyManager>) -> Self {
        Self::with_key_id(backend, keys, DEFAULT_KEY_ID)
    }

    pub fn with_key_id(
        backend: Arc<dyn PersistenceBackend>,
        keys: Arc<KeyManager>,
        key_id: &str,
    ) -> Self {
        Self {
            backend,
            keys,
            key_id: key_id.to_string(),
            max_backup_bytes: MAX_BACKUP_BLOB_BYTES,
        }
    }

    /// Override the default 10 MiB backup size limit
    pub fn with_max_backup_bytes(mut self, max: usize) -> Self {
        self.max_backup_bytes = max;
        self
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn write_key(&self) -> Result<Key> {
        self.keys.get_or_create_key(&self.key_id).await
    }

    // Reads never create a key: a missing key means the record is shredded.
    async fn read_key(&self) -> Result<Key> {
        self.keys
            .get_key(&self.key_id)
            .await?
            .ok_or(CoreError::Authentication)
    }

    /// Encrypt and persist a new entry, returning its id
    pub async fn save(
        &self,
        category: &str,
        body: &str,
        attachment: Option<&[u8]>,
        created_at: i64,
    ) -> Result<String> {
        validate_category(category)?;
        let key = self.write_key().await?;

        let commitment_hash = hash_commitment(category, body, created_at);
        let encrypted_body = encrypt_to_string(body.as_bytes(), &key)?;
        let encrypted_attachment = attachment
            .map(|bytes| encrypt_to_string(bytes, &key))
            .transpose()?;

        let record = PersistedRecord {
            id: new_entry_id(),
            category: category.to_string(),
            encrypted_body,
            encrypted_attachment,
            created_at,
            commitment_hash,
        };
        self.backend.put(&record).await?;
        debug!(id = %record.id, category, "saved entry");
        Ok(record.id)
    }

    /// [`save`](Self::save) stamped with the current time
    pub async fn save_now(
        &self,
        category: &str,
        body: &str,
        attachment: Option<&[u8]>,
    ) -> Result<String> {
        self.save(category, body, attachment, now_millis()).await
    }

    /// `Ok(None)` when no such id; `Err(Authentication)` when the record
    /// exists but the key is wrong or gone.
    pub async fn get(&self, id: &str) -> Result<Option<DiaryEntry>> {
        let Some(record) = self.backend.get(id).await? else {
            return Ok(None);
        };
        let key = self.read_key().await?;
        Ok(Some(decrypt_record(&record, &key)?))
    }

    /// Ciphertext view, no key needed
    pub async fn get_record(&self, id: &str) -> Result<Option<PersistedRecord>> {
        self.backend.get(id).await
    }

    /// Entries in one category, newest first
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<DiaryEntry>> {
        let mut records = self
            .backend
            .get_all_by_index(&IndexQuery::Category(category.to_string()))
            .await?;
        records.sort_by(newest_first);
        self.decrypt_all(&records).await
    }

    /// Every entry, newest first
    pub async fn list_all(&self) -> Result<Vec<DiaryEntry>> {
        let records = self.list_records().await?;
        self.decrypt_all(&records).await
    }

    /// Every record without decrypting, newest first
    pub async fn list_records(&self) -> Result<Vec<PersistedRecord>> {
        let mut records = self.backend.get_all().await?;
        records.sort_by(newest_first);
        Ok(records)
    }

    async fn decrypt_all(&self, records: &[PersistedRecord]) -> Result<Vec<DiaryEntry>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let key = self.read_key().await?;
        records.iter().map(|r| decrypt_record(r, &key)).collect()
    }

    /// Idempotent
    pub async fn remove(&self, id: &str) -> Result<()> {
        self.backend.delete(id).await?;
        debug!(id, "removed entry");
        Ok(())
    }

    /// Drop every record. Keys are left alone.
    pub async fn clear(&self) -> Result<()> {
        self.backend.clear().await?;
        info!("cleared all entries");
        Ok(())
    }

    /// Snapshot of every record, ciphertext untouched
    pub async fn export_all(&self) -> Result<ExportBundle> {
        let records = self.list_records().await?;
        info!(count = records.len(), "exported records");
        Ok(ExportBundle::new(records))
    }

    /// Write every record of `bundle` verbatim. The whole bundle is
    /// validated first so a malformed bundle writes nothing. No key needed.
    pub async fn import_all(&self, bundle: &ExportBundle) -> Result<usize> {
        bundle.validate()?;
        for record in &bundle.records {
            self.backend.put(record).await?;
        }
        info!(count = bundle.records.len(), "imported records");
        Ok(bundle.records.len())
    }

    /// Hand one record's ciphertext to a backup sink
    pub async fn backup_entry(
        &self,
        id: &str,
        sink: &dyn BackupSink,
    ) -> Result<Option<BackupReceipt>> {
        let Some(record) = self.backend.get(id).await? else {
            return Ok(None);
        };
        let blob = serde_json::to_vec(&record)?;
        if blob.len() > self.max_backup_bytes {
            return Err(CoreError::BackupTooLarge {
                size: blob.len(),
                max: self.max_backup_bytes,
            });
        }
        let size = blob.len();
        let locator = sink.store(blob, BackupMetadata::from(&record)).await?;
        info!(id, %locator, size, "backed up entry");
        Ok(Some(BackupReceipt {
            id: record.id,
            locator,
            size,
        }))
    }

    /// Pull a record back from a backup sink and store it verbatim
    pub async fn restore_from_backup(
        &self,
        locator: &str,
        sink: &dyn BackupSink,
    ) -> Result<Option<String>> {
        let Some(blob) = sink.fetch(locator).await? else {
            return Ok(None);
        };
        let record: PersistedRecord = serde_json::from_slice(&blob)
            .map_err(|e| CoreError::Format(format!("backup blob {locator}: {e}")))?;
        record.validate()?;
        self.backend.put(&record).await?;
        info!(id = %record.id, locator, "restored entry from backup");
        Ok(Some(record.id))
    }
}

fn newest_first(a: &PersistedRecord, b: &PersistedRecord) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Decrypt a record into its plaintext view
pub fn decrypt_record(record: &PersistedRecord, key: &Key) -> Result<DiaryEntry> {
    let body = decrypt_from_str(&record.encrypted_body, key)?;
    let body = String::from_utf8(body)
        .map_err(|_| CoreError::Format(format!("record {}: body is not UTF-8", record.id)))?;
    let attachment = record
        .encrypted_attachment
        .as_deref()
        .map(|att| decrypt_from_str(att, key))
        .transpose()?;
    Ok(DiaryEntry {
        id: record.id.clone(),
        category: record.category.clone(),
        body,
        attachment,
        created_at: record.created_at,
        commitment_hash: record.commitment_hash.clone(),
    })
}
