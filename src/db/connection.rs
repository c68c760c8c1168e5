// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lazily established, memoized store connections with bounded retry.
//!
//! Each backing store gets one `ConnectionManager`, created by the application
//! root and shared through `AppState`. The first caller of `connect()` performs
//! the handshake; every later caller gets the memoized handle back without
//! touching the network. Concurrent cold-start callers are coalesced onto the
//! same attempt.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Something that can open a connection to a backing store.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Handle shared by all request tasks once connected.
    type Handle: Send + Sync;

    /// Human readable name used in logs.
    fn target(&self) -> &str;

    /// Make one connection attempt.
    async fn connect(&self) -> anyhow::Result<Self::Handle>;
}

/// Retry budget with linearly increasing backoff (`base_delay × attempt`).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given (1-based) failed attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Error returned once the retry budget is spent.
#[derive(Debug, thiserror::Error)]
#[error("{target}: gave up after {attempts} attempts: {last_error}")]
pub struct RetriesExhausted {
    pub target: String,
    pub attempts: u32,
    pub last_error: String,
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// Sleeps `policy.backoff(n)` between failed attempt `n` and attempt `n + 1`;
/// there is no sleep after the final failure.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    target: &str,
    mut op: F,
) -> Result<T, RetriesExhausted>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(store = %target, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt < max_attempts => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    store = %target,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(RetriesExhausted {
                    target: target.to_string(),
                    attempts: attempt,
                    last_error: err.to_string(),
                });
            }
        }
    }
}

/// Memoizing connection manager for a single store.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    policy: RetryPolicy,
    handle: OnceCell<C::Handle>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        Self::with_policy(connector, RetryPolicy::default())
    }

    pub fn with_policy(connector: C, policy: RetryPolicy) -> Self {
        Self {
            connector,
            policy,
            handle: OnceCell::new(),
        }
    }

    /// Whether a connection has been established. Never goes back to `false`.
    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }

    pub fn target(&self) -> &str {
        self.connector.target()
    }

    /// Return the memoized handle, connecting first if needed.
    ///
    /// A failed cold start leaves the manager unconnected so a later call can
    /// try again; callers that must not continue use [`Self::get`].
    pub async fn connect(&self) -> Result<&C::Handle, RetriesExhausted> {
        if let Some(handle) = self.handle.get() {
            return Ok(handle);
        }

        self.handle
            .get_or_try_init(|| async {
                let target = self.connector.target();
                let handle = retry_with_backoff(self.policy, target, |_| self.connector.connect())
                    .await?;
                tracing::info!(store = %target, "Connection established");
                Ok::<_, RetriesExhausted>(handle)
            })
            .await
    }

    /// Return the handle, terminating the process if the store is unreachable.
    ///
    /// There is no degraded mode: a store that cannot be reached within the
    /// retry budget is fatal.
    pub async fn get(&self) -> &C::Handle {
        match self.connect().await {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!(
                    store = %err.target,
                    attempts = err.attempts,
                    error = %err.last_error,
                    "Connection retries exhausted, shutting down"
                );
                std::process::exit(1);
            }
        }
    }
}
