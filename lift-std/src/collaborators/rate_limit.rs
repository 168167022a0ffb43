//! An in-process token-bucket [`RateLimitStore`], suitable for a
//! single-instance deployment or for tests; a multi-instance deployment
//! should inject a shared-store implementation instead (Redis, DynamoDB).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use lift_core::collaborators::{RateLimitDecision, RateLimitStore};

struct Bucket {
    remaining: u64,
    window_started_at: Instant,
}

#[derive(Default)]
pub struct InMemoryRateLimitStore {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn try_consume(&self, key: &str, limit: u64, window_secs: u64) -> RateLimitDecision {
        let mut buckets = self.buckets.lock().unwrap();
        let now = Instant::now();
        let bucket = buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            remaining: limit,
            window_started_at: now,
        });

        if now.duration_since(bucket.window_started_at).as_secs() >= window_secs {
            bucket.remaining = limit;
            bucket.window_started_at = now;
        }

        let reset_at = bucket.window_started_at + std::time::Duration::from_secs(window_secs);
        let reset_at_epoch_secs = reset_at
            .checked_duration_since(Instant::now())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        if bucket.remaining == 0 {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at_epoch_secs,
            };
        }

        bucket.remaining -= 1;
        RateLimitDecision {
            allowed: true,
            remaining: bucket.remaining,
            reset_at_epoch_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_limit_then_rejects() {
        let store = InMemoryRateLimitStore::new();
        for _ in 0..3 {
            let decision = store.try_consume("k", 3, 60).await;
            assert!(decision.allowed);
        }
        let decision = store.try_consume("k", 3, 60).await;
        assert!(!decision.allowed);
    }

    #[tokio::test]
    async fn distinct_keys_have_independent_buckets() {
        let store = InMemoryRateLimitStore::new();
        for _ in 0..3 {
            store.try_consume("a", 3, 60).await;
        }
        let decision = store.try_consume("b", 3, 60).await;
        assert!(decision.allowed);
    }
}
