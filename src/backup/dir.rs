//! Content-addressed directory sink
//!
//! Each blob lands in `<root>/<blake3>.bin` with its metadata next to it in
//! `<root>/<blake3>.json`. The locator is `dir://<blake3>`, so fetching never
//! builds a path from anything but 64 hex chars.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::BackupSink;
use crate::error::{CoreError, Result};
use crate::models::BackupMetadata;

pub const DIR_LOCATOR_PREFIX: &str = "dir://";

const BLAKE3_HEX_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct DirBackupSink {
    root: PathBuf,
}

impl DirBackupSink {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn digest_of(locator: &str) -> Result<&str> {
        let digest = locator
            .strip_prefix(DIR_LOCATOR_PREFIX)
            .ok_or_else(|| CoreError::Format(format!("not a directory locator: {locator}")))?;
        let is_hex = digest.len() == BLAKE3_HEX_LEN
            && digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !is_hex {
            return Err(CoreError::Format(format!("bad blob digest in {locator}")));
        }
        Ok(digest)
    }

    /// Metadata stored next to a blob, `None` when the locator is unknown
    pub async fn metadata(&self, locator: &str) -> Result<Option<BackupMetadata>> {
        let digest = Self::digest_of(locator)?;
        match fs::read(self.root.join(format!("{digest}.json"))).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl BackupSink for DirBackupSink {
    async fn store(&self, blob: Vec<u8>, metadata: BackupMetadata) -> Result<String> {
        fs::create_dir_all(&self.root).await?;
        let digest = blake3::hash(&blob).to_hex();
        fs::write(self.root.join(format!("{digest}.bin")), &blob).await?;
        fs::write(
            self.root.join(format!("{digest}.json")),
            serde_json::to_vec_pretty(&metadata)?,
        )
        .await?;
        debug!(root = %self.root.display(), %digest, size = blob.len(), "stored backup blob");
        Ok(format!("{DIR_LOCATOR_PREFIX}{digest}"))
    }

    async fn fetch(&self, locator: &str) -> Result<Option<Vec<u8>>> {
        let digest = Self::digest_of(locator)?;
        match fs::read(self.root.join(format!("{digest}.bin"))).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
