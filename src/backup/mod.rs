//! Backup sink boundary
//!
//! A sink receives opaque ciphertext blobs plus non-sensitive metadata and
//! hands back a locator. It never sees plaintext or keys. Transient-failure
//! handling lives here, not in the store: wrap any sink in [`RetryingSink`].

use async_trait::async_trait;

use crate::error::Result;
use crate::models::BackupMetadata;

pub mod dir;
pub mod memory;
pub mod retry;

pub use dir::DirBackupSink;
pub use memory::MemoryBackupSink;
pub use retry::{retry_async, RetryPolicy, RetryingSink};

#[async_trait]
pub trait BackupSink: Send + Sync {
    /// Store a blob, returning an opaque locator for later retrieval
    async fn store(&self, blob: Vec<u8>, metadata: BackupMetadata) -> Result<String>;

    /// `Ok(None)` when the locator is unknown to the sink
    async fn fetch(&self, locator: &str) -> Result<Option<Vec<u8>>>;
}
