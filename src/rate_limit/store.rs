use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{RateLimitDecision, RateLimitPolicy, RateLimitResult};

// Rate limit entry - tracks requests per identifier in the current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_time: i64, // epoch ms when the window closes
}

impl RateLimitEntry {
    // first request of a new window
    fn open(now_ms: i64, policy: &RateLimitPolicy) -> Self {
        let window = i64::try_from(policy.window_ms()).unwrap_or(i64::MAX);
        Self {
            count: 1,
            reset_time: now_ms.saturating_add(window),
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.reset_time <= now_ms
    }

    // Count one more request against a live window. Never passes the ceiling.
    fn record(&mut self, policy: &RateLimitPolicy) -> RateLimitDecision {
        if self.count >= policy.max_requests() {
            return RateLimitDecision::limited(self.reset_time);
        }
        self.count += 1;
        RateLimitDecision::admitted(policy.max_requests() - self.count, self.reset_time)
    }
}

// `hit` does the whole read-check-increment for one key atomically
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn hit(
        &self,
        identifier: &str,
        policy: &RateLimitPolicy,
        now_ms: i64,
    ) -> RateLimitResult<RateLimitDecision>;

    /// Remove every expired entry, returning how many went away.
    async fn sweep_expired(&self, now_ms: i64) -> RateLimitResult<usize>;

    async fn len(&self) -> RateLimitResult<usize>;
}

// Process-local, lost on restart
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<RateLimitEntry> {
        self.entries.get(identifier).map(|entry| *entry)
    }

    // Seed an entry directly, bypassing admission
    pub fn insert(&self, identifier: impl Into<String>, entry: RateLimitEntry) {
        self.entries.insert(identifier.into(), entry);
    }
}

#[async_trait]
impl RateLimitStore for InMemoryStore {
    async fn hit(
        &self,
        identifier: &str,
        policy: &RateLimitPolicy,
        now_ms: i64,
    ) -> RateLimitResult<RateLimitDecision> {
        // the shard stays locked for the whole match
        let decision = match self.entries.entry(identifier.to_string()) {
            Entry::Vacant(slot) => {
                let entry = slot.insert(RateLimitEntry::open(now_ms, policy));
                RateLimitDecision::admitted(policy.max_requests() - 1, entry.reset_time)
            }
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                if entry.is_expired(now_ms) {
                    *entry = RateLimitEntry::open(now_ms, policy);
                    RateLimitDecision::admitted(policy.max_requests() - 1, entry.reset_time)
                } else {
                    entry.record(policy)
                }
            }
        };
        Ok(decision)
    }

    async fn sweep_expired(&self, now_ms: i64) -> RateLimitResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now_ms));
        Ok(before.saturating_sub(self.entries.len()))
    }

    async fn len(&self) -> RateLimitResult<usize> {
        Ok(self.entries.len())
    }
}
