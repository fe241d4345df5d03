// tests/common.rs
//! Shared test utilities: logging setup and fresh in-memory stores

#![allow(dead_code)]

use std::sync::Arc;

use diary_vault::{EntryStore, KeyManager, MemoryBackend};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize test-friendly logging. Idempotent; respects RUST_LOG.
pub fn setup() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

/// Everything a store test needs, sharing one in-memory backend
pub struct TestStore {
    pub backend: Arc<MemoryBackend>,
    pub keys: Arc<KeyManager>,
    pub store: EntryStore,
}

impl TestStore {
    pub fn new() -> Self {
        setup();
        let backend = Arc::new(MemoryBackend::new());
        let keys = Arc::new(KeyManager::new(backend.clone()));
        let store = EntryStore::new(backend.clone(), keys.clone());
        Self {
            backend,
            keys,
            store,
        }
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

pub const RUN_BODY: &str = "Ran 5km today, felt strong and kept a steady pace the whole way.";
pub const RUN_CREATED_AT: i64 = 1_700_000_000_000;
