use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult, WindowHit};

/// In-process cache backend.
///
/// Used when `REDIS_URL` is not configured (single-instance deployments,
/// local development) and by the test suite. Counters are per-process, so
/// the limiter is only as global as the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryClient {
    windows: Arc<Mutex<HashMap<String, WindowEntry>>>,
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u64,
    expires_at: Instant,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheClient for MemoryClient {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn incr_window(&self, key: &str, ttl: Duration) -> CacheResult<WindowHit> {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| CacheError::BackendCommand("poisoned lock".to_string()))?;

        // Drop expired windows lazily; the map only ever holds live keys
        // plus whatever expired since the last call.
        windows.retain(|_, entry| entry.expires_at > now);

        let entry = windows.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            expires_at: now + ttl,
        });
        entry.count += 1;

        Ok(WindowHit {
            count: entry.count,
            retry_after: entry.expires_at.saturating_duration_since(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_within_a_window() {
        let cache = MemoryClient::new();
        let ttl = Duration::from_secs(60);

        for expected in 1..=4 {
            let hit = cache.incr_window("k", ttl).await.unwrap();
            assert_eq!(hit.count, expected);
            assert!(hit.retry_after <= ttl);
        }
    }

    #[tokio::test]
    async fn separate_keys_do_not_share_counts() {
        let cache = MemoryClient::new();
        let ttl = Duration::from_secs(60);

        cache.incr_window("a", ttl).await.unwrap();
        cache.incr_window("a", ttl).await.unwrap();
        let hit = cache.incr_window("b", ttl).await.unwrap();
        assert_eq!(hit.count, 1);
    }

    #[tokio::test]
    async fn window_resets_after_expiry() {
        let cache = MemoryClient::new();
        let ttl = Duration::from_millis(40);

        cache.incr_window("k", ttl).await.unwrap();
        cache.incr_window("k", ttl).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        let hit = cache.incr_window("k", ttl).await.unwrap();
        assert_eq!(hit.count, 1);
    }
}
