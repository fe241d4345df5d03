//! Pure cryptographic primitives, no I/O and no database
//!
//! AES-256-GCM over in-memory buffers plus the canonical text form of an
//! envelope. Every call to [`encrypt`] draws a fresh 96-bit IV.

use std::fmt;
use std::str::FromStr;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;

use crate::aliases::MasterKey32;
use crate::consts::{ENVELOPE_DELIMITER, IV_LEN, TAG_LEN};
use crate::error::{CoreError, Result};

/// IV plus ciphertext (GCM tag appended) produced by one encryption call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherEnvelope {
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

impl CipherEnvelope {
    /// Canonical `base64(iv):base64(ciphertext)` form
    pub fn serialize(&self) -> String {
        format!(
            "{}{}{}",
            STANDARD.encode(self.iv),
            ENVELOPE_DELIMITER,
            STANDARD.encode(&self.ciphertext)
        )
    }

    pub fn deserialize(s: &str) -> Result<Self> {
        let mut parts = s.split(ENVELOPE_DELIMITER);
        let (iv_b64, ct_b64) = match (parts.next(), parts.next(), parts.next()) {
            (Some(iv), Some(ct), None) => (iv, ct),
            _ => {
                return Err(CoreError::Format(
                    "envelope must contain exactly one delimiter".into(),
                ))
            }
        };

        let iv = STANDARD
            .decode(iv_b64)
            .map_err(|e| CoreError::Format(format!("envelope iv: {e}")))?;
        let iv: [u8; IV_LEN] = iv.try_into().map_err(|v: Vec<u8>| {
            CoreError::Format(format!("envelope iv is {} bytes, expected {IV_LEN}", v.len()))
        })?;

        let ciphertext = STANDARD
            .decode(ct_b64)
            .map_err(|e| CoreError::Format(format!("envelope ciphertext: {e}")))?;
        if ciphertext.len() < TAG_LEN {
            return Err(CoreError::Format(format!(
                "envelope ciphertext is {} bytes, shorter than the {TAG_LEN}-byte tag",
                ciphertext.len()
            )));
        }

        Ok(Self { iv, ciphertext })
    }
}

impl fmt::Display for CipherEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for CipherEnvelope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::deserialize(s)
    }
}

fn cipher_for(key: &MasterKey32) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.expose_secret()))
}

/// Fresh random 96-bit IV
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);
    iv
}

/// Encrypt plaintext in memory → envelope with a fresh IV
pub fn encrypt(plaintext: &[u8], key: &MasterKey32) -> Result<CipherEnvelope> {
    if plaintext.is_empty() {
        return Err(CoreError::EmptyInput);
    }
    let iv = generate_iv();
    let ciphertext = cipher_for(key)
        .encrypt(Nonce::from_slice(&iv), plaintext)
        // only reachable for inputs beyond GCM's length limit
        .map_err(|_| CoreError::Format("plaintext too large for AES-GCM".into()))?;
    Ok(CipherEnvelope { iv, ciphertext })
}

/// Decrypt an envelope → plaintext, or `Authentication` with nothing else
pub fn decrypt(envelope: &CipherEnvelope, key: &MasterKey32) -> Result<Vec<u8>> {
    cipher_for(key)
        .decrypt(Nonce::from_slice(&envelope.iv), envelope.ciphertext.as_slice())
        .map_err(|_| CoreError::Authentication)
}

/// Encrypt and serialize in one step
pub fn encrypt_to_string(plaintext: &[u8], key: &MasterKey32) -> Result<String> {
    Ok(encrypt(plaintext, key)?.serialize())
}

/// Deserialize and decrypt in one step
pub fn decrypt_from_str(serialized: &str, key: &MasterKey32) -> Result<Vec<u8>> {
    decrypt(&CipherEnvelope::deserialize(serialized)?, key)
}
