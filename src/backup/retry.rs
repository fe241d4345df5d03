//! Exponential backoff for backup I/O
//!
//! Delay starts at `initial_delay`, is capped at `max_delay`, gets ±10%
//! jitter when enabled, and grows by `backoff_factor` after each failure.
//! Only errors for which [`CoreError::is_transient`] holds are retried.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{error, info, warn};

use super::BackupSink;
use crate::config::BackupConfig;
use crate::error::Result;
use crate::models::BackupMetadata;

const JITTER_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl RetryPolicy {
    /// Fast operations
    pub fn quick() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
            jitter: true,
        }
    }

    pub fn standard() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
            jitter: true,
        }
    }

    /// Expensive operations
    pub fn patient() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            backoff_factor: 2.0,
            jitter: true,
        }
    }

    /// External network services
    pub fn network() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(16),
            backoff_factor: 2.0,
            jitter: true,
        }
    }

    pub fn from_config(config: &BackupConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_factor: config.backoff_factor,
            jitter: config.jitter,
        }
    }

    /// Sleep before retry number `attempt` (1-based), before jitter
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.powi(attempt.saturating_sub(1) as i32);
        let secs = self.initial_delay.as_secs_f64() * factor;
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt).as_secs_f64();
        if !self.jitter || base == 0.0 {
            return Duration::from_secs_f64(base);
        }
        let range = base * JITTER_FRACTION;
        let jittered = base + rand::rng().random_range(-range..=range);
        Duration::from_secs_f64(jittered.max(0.0))
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// policy's attempts are exhausted. The last error is returned.
pub async fn retry_async<F, Fut, T>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, max_attempts, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if attempt >= max_attempts => {
                error!(max_attempts, error = %e, "all attempts failed");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Any sink, with every call wrapped in [`retry_async`]
pub struct RetryingSink<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: BackupSink> RetryingSink<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: BackupSink> BackupSink for RetryingSink<S> {
    async fn store(&self, blob: Vec<u8>, metadata: BackupMetadata) -> Result<String> {
        retry_async(&self.policy, || self.inner.store(blob.clone(), metadata.clone())).await
    }

    async fn fetch(&self, locator: &str) -> Result<Option<Vec<u8>>> {
        retry_async(&self.policy, || self.inner.fetch(locator)).await
    }
}

