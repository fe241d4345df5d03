// src/config/mod.rs
//! Configuration system for diary-vault
//!
//! Central, lazy-loaded global config with TOML + env overrides.

pub use app::{from_file, load, BackupConfig, Config, KeysConfig, Paths};

mod app;
mod defaults;
