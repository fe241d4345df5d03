// src/enums.rs
//! Public enum types used throughout the crate
//!
//! Central location for the user-visible choices that end up in
//! serialized artefacts: key descriptors and export bundles.

use serde::{Deserialize, Serialize};

/// Supported encryption algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub enum EncryptionAlgorithm {
    #[default]
    #[serde(rename = "AES-GCM")]
    Aes256Gcm,
}

/// Export bundle formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "diary-vault-v1")]
    JsonV1,
}

/// Secondary indexes maintained by every persistence backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexQuery {
    Category(String),
    CreatedAt(i64),
}
