// src/export/mod.rs
//! Export utilities for diary-vault
//!
//! Bundles carry ciphertext only. Moving a bundle never moves a key.

pub use json::{read_bundle, write_bundle, ExportBundle};

pub mod json;
