// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{BackupConfig, KeysConfig, Paths};
use crate::consts::{DEFAULT_KEY_ID, DEFAULT_STORE_DIR, DEFAULT_STORE_FILE, MAX_BACKUP_BLOB_BYTES};

pub const DEFAULT_CONFIG_FILE: &str = "diary-config.toml";

pub fn default_store_db() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_STORE_DIR)
        .join(DEFAULT_STORE_FILE)
        .to_string_lossy()
        .into_owned()
}

pub fn default_paths() -> Paths {
    Paths {
        store_db: default_store_db(),
    }
}

pub fn default_keys() -> KeysConfig {
    KeysConfig {
        default_key_id: DEFAULT_KEY_ID.into(),
        store_passphrase: None,
    }
}

pub fn default_backup() -> BackupConfig {
    BackupConfig {
        max_blob_bytes: MAX_BACKUP_BLOB_BYTES,
        max_attempts: 3,
        initial_delay_ms: 1_000,
        max_delay_ms: 30_000,
        backoff_factor: 2.0,
        jitter: true,
    }
}
