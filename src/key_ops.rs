//! Key generation and representation utilities
//!
//! This module handles secure key generation and the neutral
//! [`PortableKey`] descriptor users archive for manual backup.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::aliases::MasterKey32;
use crate::consts::{KEY_LEN_BITS, KEY_LEN_BYTES};
use crate::enums::EncryptionAlgorithm;
use crate::error::{CoreError, Result};

pub type Key = MasterKey32;

/// Generate a new random 256-bit master key
#[inline]
pub fn generate_key() -> Key {
    let mut bytes = [0u8; KEY_LEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    Key::new(bytes)
}

/// Rebuild a key from stored bytes, rejecting anything but 32 bytes
pub fn key_from_bytes(bytes: &[u8]) -> Result<Key> {
    let bytes: [u8; KEY_LEN_BYTES] = bytes.try_into().map_err(|_| {
        CoreError::Format(format!(
            "key material is {} bytes, expected {KEY_LEN_BYTES}",
            bytes.len()
        ))
    })?;
    Ok(Key::new(bytes))
}

/// Archivable key descriptor, not tied to any interchange standard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortableKey {
    pub algorithm: EncryptionAlgorithm,
    pub key_length_bits: u32,
    pub raw_key_base64: String,
}

impl PortableKey {
    pub fn from_key(key: &Key) -> Self {
        Self {
            algorithm: EncryptionAlgorithm::Aes256Gcm,
            key_length_bits: KEY_LEN_BITS,
            raw_key_base64: STANDARD.encode(key.expose_secret()),
        }
    }

    /// Validate the descriptor and decode the key it carries
    pub fn to_key(&self) -> Result<Key> {
        if self.algorithm != EncryptionAlgorithm::Aes256Gcm {
            return Err(CoreError::Format(format!(
                "unsupported key algorithm {:?}",
                self.algorithm
            )));
        }
        if self.key_length_bits != KEY_LEN_BITS {
            return Err(CoreError::Format(format!(
                "key length {} bits, expected {KEY_LEN_BITS}",
                self.key_length_bits
            )));
        }
        let raw = STANDARD
            .decode(&self.raw_key_base64)
            .map_err(|e| CoreError::Format(format!("raw key base64: {e}")))?;
        key_from_bytes(&raw)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| CoreError::Format(format!("portable key: {e}")))
    }
}
