//! Record models: the plaintext and ciphertext views of a diary entry.

use serde::{Deserialize, Serialize};

use crate::core::crypto::CipherEnvelope;
use crate::core::util::is_commitment_hex;
use crate::error::{CoreError, Result};

/// Decrypted view handed to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryEntry {
    pub id: String,
    pub category: String,
    pub body: String,
    pub attachment: Option<Vec<u8>>,
    /// Epoch milliseconds
    pub created_at: i64,
    /// SHA-256 over (category, body, created_at), lowercase hex
    pub commitment_hash: String,
}

/// What the persistence backend stores. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: String,
    pub category: String,
    /// Serialized envelope, `base64(iv):base64(ciphertext)`
    pub encrypted_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_attachment: Option<String>,
    pub created_at: i64,
    pub commitment_hash: String,
}

impl PersistedRecord {
    /// Structural check that needs no key: id present, envelopes parse,
    /// commitment is 64 lowercase hex chars.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(CoreError::Format("record id is empty".into()));
        }
        CipherEnvelope::deserialize(&self.encrypted_body)
            .map_err(|e| CoreError::Format(format!("record {}: body: {e}", self.id)))?;
        if let Some(att) = &self.encrypted_attachment {
            CipherEnvelope::deserialize(att)
                .map_err(|e| CoreError::Format(format!("record {}: attachment: {e}", self.id)))?;
        }
        if !is_commitment_hex(&self.commitment_hash) {
            return Err(CoreError::Format(format!(
                "record {}: commitment hash is not 64 lowercase hex chars",
                self.id
            )));
        }
        Ok(())
    }
}

/// Non-sensitive metadata that travels next to a backup blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub category: String,
    pub created_at: i64,
    pub commitment_hash: String,
}

impl From<&PersistedRecord> for BackupMetadata {
    fn from(record: &PersistedRecord) -> Self {
        Self {
            category: record.category.clone(),
            created_at: record.created_at,
            commitment_hash: record.commitment_hash.clone(),
        }
    }
}

/// Result of handing one record to a backup sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupReceipt {
    pub id: String,
    pub locator: String,
    pub size: usize,
}
