//! Content-addressed in-memory sink

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BackupSink;
use crate::error::Result;
use crate::models::BackupMetadata;

pub const MEMORY_LOCATOR_PREFIX: &str = "mem://";

#[derive(Debug, Default)]
pub struct MemoryBackupSink {
    blobs: RwLock<HashMap<String, (Vec<u8>, BackupMetadata)>>,
}

impl MemoryBackupSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    pub async fn metadata(&self, locator: &str) -> Option<BackupMetadata> {
        self.blobs
            .read()
            .await
            .get(locator)
            .map(|(_, meta)| meta.clone())
    }
}

#[async_trait]
impl BackupSink for MemoryBackupSink {
    async fn store(&self, blob: Vec<u8>, metadata: BackupMetadata) -> Result<String> {
        let locator = format!("{MEMORY_LOCATOR_PREFIX}{}", blake3::hash(&blob).to_hex());
        self.blobs
            .write()
            .await
            .insert(locator.clone(), (blob, metadata));
        Ok(locator)
    }

    async fn fetch(&self, locator: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .blobs
            .read()
            .await
            .get(locator)
            .map(|(blob, _)| blob.clone()))
    }
}
