// fixed-window limiter: the window opens on the first request after the
// previous one closed, limited until reset_time passes

mod clock;
mod policy;
mod store;
mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use policy::{Policies, PolicyError, RateLimitPolicy};
pub use store::{InMemoryStore, RateLimitEntry, RateLimitStore};
pub use sweeper::sweeper;

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::metrics::{RATE_LIMIT_STORE_SIZE, RATE_LIMIT_SWEPT};

// sweep inline once the store grows past this
pub const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limit backend error: {0}")]
    Backend(String),
}

pub type RateLimitResult<T> = Result<T, RateLimitError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub is_limited: bool,
    pub remaining: u32,
    pub reset_time: i64,
}

impl RateLimitDecision {
    pub fn admitted(remaining: u32, reset_time: i64) -> Self {
        Self {
            is_limited: false,
            remaining,
            reset_time,
        }
    }

    pub fn limited(reset_time: i64) -> Self {
        Self {
            is_limited: true,
            remaining: 0,
            reset_time,
        }
    }
}

// Owned by AppState; tests build their own instance
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    sweep_threshold: usize,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
        }
    }

    // In-memory store on the wall clock
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), Arc::new(SystemClock))
    }

    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold;
        self
    }

    pub fn sweep_threshold(&self) -> usize {
        self.sweep_threshold
    }

    /// Decide whether `identifier` may make one more request under `policy`.
    pub async fn check(
        &self,
        identifier: &str,
        policy: &RateLimitPolicy,
    ) -> RateLimitResult<RateLimitDecision> {
        let size = self.store.len().await?;
        RATE_LIMIT_STORE_SIZE.set(size as i64);
        if size > self.sweep_threshold {
            self.sweep().await?;
        }

        let now = self.clock.now_ms();
        let decision = self.store.hit(identifier, policy, now).await?;

        if decision.is_limited {
            tracing::debug!(identifier, reset_time = decision.reset_time, "rate limited");
        }

        Ok(decision)
    }

    // Same as `check` with the default 10 per minute policy
    pub async fn check_default(&self, identifier: &str) -> RateLimitResult<RateLimitDecision> {
        self.check(identifier, &RateLimitPolicy::DEFAULT).await
    }

    pub async fn sweep(&self) -> RateLimitResult<usize> {
        let removed = self.store.sweep_expired(self.clock.now_ms()).await?;
        let remaining = self.store.len().await?;

        RATE_LIMIT_SWEPT.inc_by(removed as u64);
        RATE_LIMIT_STORE_SIZE.set(remaining as i64);
        if removed > 0 {
            tracing::debug!(removed, remaining, "swept expired rate limit windows");
        }
        Ok(removed)
    }

    pub async fn len(&self) -> RateLimitResult<usize> {
        self.store.len().await
    }
}
