use crate::config::Settings;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// Terminal result of a policy-wrapped call. Errors never escape the policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallResult {
    Value(f64),
    /// The source answered without the value; not retried.
    Missing,
    /// Every attempt failed or timed out.
    Exhausted,
}

/// Per-source spacing plus bounded exponential-backoff retries.
///
/// Calls to one source are serialized: the slot lock is held for the duration of an
/// attempt, and the next attempt waits until `min_delay` has passed since the previous
/// one completed. Different sources never wait on each other.
#[derive(Debug)]
pub struct RetryPolicy {
    min_delay: Duration,
    max_retries: u32,
    backoff_base: Duration,
    attempt_timeout: Duration,
    last_call: DashMap<String, Arc<Mutex<Option<Instant>>>>,
}

impl RetryPolicy {
    pub fn new(
        min_delay: Duration,
        max_retries: u32,
        backoff_base: Duration,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            min_delay,
            max_retries,
            backoff_base,
            attempt_timeout,
            last_call: DashMap::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.provider_min_delay,
            settings.provider_max_retries,
            settings.provider_backoff_base,
            settings.provider_attempt_timeout,
        )
    }

    pub async fn run<F, Fut>(&self, source: &str, mut call: F) -> CallResult
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<f64>>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match self.spaced(source, call()).await {
                Ok(Ok(Some(value))) if value.is_finite() => return CallResult::Value(value),
                Ok(Ok(Some(value))) => {
                    tracing::warn!(source, value, "provider returned a non-finite value; ignoring");
                    return CallResult::Missing;
                }
                Ok(Ok(None)) => return CallResult::Missing,
                Ok(Err(err)) => {
                    tracing::warn!(source, attempt, error = %err, "provider fetch failed");
                }
                Err(_) => {
                    tracing::warn!(
                        source,
                        attempt,
                        timeout = ?self.attempt_timeout,
                        "provider fetch timed out"
                    );
                }
            }

            if attempt >= self.max_retries {
                return CallResult::Exhausted;
            }
            let backoff = self.backoff(attempt);
            tracing::debug!(source, attempt, ?backoff, "retrying provider fetch");
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(1u32 << attempt.min(16))
    }

    async fn spaced<Fut>(
        &self,
        source: &str,
        fut: Fut,
    ) -> Result<anyhow::Result<Option<f64>>, tokio::time::error::Elapsed>
    where
        Fut: Future<Output = anyhow::Result<Option<f64>>>,
    {
        let slot = self.last_call.entry(source.to_string()).or_default().clone();
        let last = slot.lock().await;

        if let Some(prev) = *last {
            tokio::time::sleep_until(prev + self.min_delay).await;
        }

        let _stamp = Stamp(last);
        tokio::time::timeout(self.attempt_timeout, fut).await
    }
}

/// Records when an attempt ended, including an attempt dropped mid-flight by an outer
/// deadline, so the next call to the source still waits out `min_delay`.
struct Stamp<'a>(MutexGuard<'a, Option<Instant>>);

impl Drop for Stamp<'_> {
    fn drop(&mut self) {
        *self.0 = Some(Instant::now());
    }
}
