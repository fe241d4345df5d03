// src/config/app.rs
use super::defaults::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

use crate::aliases::StorePassphrase;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub store_db: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    pub default_key_id: String,
    /// SQLCipher passphrase; the store file is unencrypted when unset
    pub store_passphrase: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub max_blob_bytes: usize,
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_factor: f64,
    pub jitter: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            paths: default_paths(),
            keys: default_keys(),
            backup: default_backup(),
        }
    }
}

impl Default for Paths {
    fn default() -> Self {
        default_paths()
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        default_keys()
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        default_backup()
    }
}

impl Config {
    /// Store path with the `DIARY_STORE_DB` override applied
    pub fn store_db_path(&self) -> PathBuf {
        std::env::var("DIARY_STORE_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(&self.paths.store_db))
    }

    /// Passphrase from `DIARY_STORE_PASSPHRASE`, else from the file
    pub fn store_passphrase(&self) -> Option<StorePassphrase> {
        std::env::var("DIARY_STORE_PASSPHRASE")
            .ok()
            .or_else(|| self.keys.store_passphrase.clone())
            .map(StorePassphrase::new)
    }
}

/// Parse a config file, reporting problems instead of falling back
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    toml::from_str(&content)
        .map_err(|e| CoreError::Config(format!("{}: {e}", path.as_ref().display())))
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load config at runtime. Falls back to defaults if missing or invalid.
pub fn load() -> &'static Config {
    CONFIG.get_or_init(|| {
        let config_path =
            std::env::var("DIARY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        if !Path::new(&config_path).exists() {
            return Config::default();
        }
        match from_file(&config_path) {
            Ok(conf) => conf,
            Err(e) => {
                warn!(error = %e, "invalid config, using built-in defaults");
                Config::default()
            }
        }
    })
}
