// src/consts.rs
//! Shared constants: security parameters and defaults

/// Key id used when the caller does not name one
pub const DEFAULT_KEY_ID: &str = "master";

/// AES-256-GCM key length
pub const KEY_LEN_BYTES: usize = 32;
pub const KEY_LEN_BITS: u32 = 256;

/// 96-bit GCM nonce
pub const IV_LEN: usize = 12;

/// GCM authentication tag appended to every ciphertext
pub const TAG_LEN: usize = 16;

/// Separator between the two base64 segments of a serialized envelope.
/// Not part of the standard base64 alphabet.
pub const ENVELOPE_DELIMITER: char = ':';

/// Separator used when building the commitment preimage
pub const COMMITMENT_DELIMITER: char = ':';

/// Length of a hex-encoded SHA-256 commitment
pub const COMMITMENT_HEX_LEN: usize = 64;

/// Random bytes behind every entry id (128 bits → 32 hex chars)
pub const ENTRY_ID_BYTES: usize = 16;

/// Largest ciphertext blob handed to a backup sink (10 MiB)
pub const MAX_BACKUP_BLOB_BYTES: usize = 10 * 1024 * 1024;

/// Recommended KDF iterations for SQLCipher databases
pub const DB_KDF_ITERATIONS: u32 = 256_000;

/// Default on-disk store location relative to the data dir
pub const DEFAULT_STORE_DIR: &str = "diary-vault";
pub const DEFAULT_STORE_FILE: &str = "store.db";
