//! Small utility functions used across the core module
//!
//! Hashing helpers, id generation and clock access.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::consts::{COMMITMENT_DELIMITER, COMMITMENT_HEX_LEN, ENTRY_ID_BYTES};
use crate::error::{CoreError, Result};

/// Compute SHA-256 and return it as a lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Commitment digest over the plaintext fields of an entry.
///
/// Preimage is `"{category}:{body}:{created_at}"` with `created_at` in
/// decimal. IV and ciphertext never enter the hash.
pub fn hash_commitment(category: &str, body: &str, created_at: i64) -> String {
    let preimage = format!(
        "{category}{d}{body}{d}{created_at}",
        d = COMMITMENT_DELIMITER
    );
    sha256_hex(preimage.as_bytes())
}

/// Categories are non-empty and never contain the preimage delimiter, so
/// every commitment preimage splits back into exactly one triple.
pub fn validate_category(category: &str) -> Result<()> {
    if category.is_empty() {
        return Err(CoreError::InvalidCategory("category is empty".into()));
    }
    if category.contains(COMMITMENT_DELIMITER) {
        return Err(CoreError::InvalidCategory(format!(
            "category {category:?} contains '{COMMITMENT_DELIMITER}'"
        )));
    }
    Ok(())
}

/// True for a 64-char lowercase hex string
pub fn is_commitment_hex(s: &str) -> bool {
    s.len() == COMMITMENT_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Random 128-bit entry id, lowercase hex
pub fn new_entry_id() -> String {
    let mut bytes = [0u8; ENTRY_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
