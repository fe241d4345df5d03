// src/lib.rs
//! diary-vault: an encrypted local diary with publishable commitments
//!
//! Features:
//! - AES-256-GCM envelopes, fresh 96-bit IV per field
//! - SHA-256 commitment digests over plaintext, stored in the clear
//! - Lazily generated master keys with portable export/import
//! - In-memory and SQLCipher persistence behind async traits
//! - Ciphertext-only export bundles and backup sinks

pub mod aliases;
pub mod backend;
pub mod backup;
pub mod config;
pub mod consts;
pub mod core;
pub mod enums;
pub mod error;
pub mod export;
pub mod key_manager;
pub mod key_ops;
pub mod models;
pub mod store;

// Re-export everything users need at the crate root
pub use aliases::MasterKey32;
pub use backend::{KeyBackend, MemoryBackend, PersistenceBackend, SqliteBackend};
pub use backup::{BackupSink, DirBackupSink, MemoryBackupSink, RetryPolicy, RetryingSink};
pub use config::load as load_config;
pub use crate::core::crypto::CipherEnvelope;
pub use crate::core::util::hash_commitment;
pub use enums::IndexQuery;
pub use error::{CoreError, Result};
pub use export::ExportBundle;
pub use key_manager::KeyManager;
pub use key_ops::PortableKey;
pub use models::{BackupMetadata, BackupReceipt, DiaryEntry, PersistedRecord};
pub use store::EntryStore;
