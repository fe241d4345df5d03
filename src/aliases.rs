// src/aliases.rs
//! Secret wrappers used throughout diary-vault
//!
//! Both types zero their memory on drop and only hand out the raw value
//! through an explicit `expose_secret` call. `Debug` never prints it.

use std::fmt;

use zeroize::ZeroizeOnDrop;

use crate::consts::KEY_LEN_BYTES;

/// 256-bit AES-GCM master key
#[derive(ZeroizeOnDrop)]
pub struct MasterKey32([u8; KEY_LEN_BYTES]);

impl MasterKey32 {
    pub fn new(bytes: [u8; KEY_LEN_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn expose_secret(&self) -> &[u8; KEY_LEN_BYTES] {
        &self.0
    }
}

impl fmt::Debug for MasterKey32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey32([REDACTED])")
    }
}

/// SQLCipher passphrase for the on-disk store
#[derive(ZeroizeOnDrop)]
pub struct StorePassphrase(String);

impl StorePassphrase {
    pub fn new(passphrase: String) -> Self {
        Self(passphrase)
    }

    pub fn expose_secret(&self) -> &String {
        &self.0
    }
}

impl fmt::Debug for StorePassphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StorePassphrase([REDACTED])")
    }
}
