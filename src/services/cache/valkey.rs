use async_trait::async_trait;
use std::time::Duration;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult, WindowHit};

/// Valkey/Redis-backed cache client.
///
/// Only implements what the rate limiter needs: `INCR` + `PEXPIRE NX`
/// (so the window clock starts on the first hit and is never extended)
/// + `PTTL` for the Retry-After value.
#[derive(Clone, Debug)]
pub struct ValkeyClient {
    manager: redis::aio::ConnectionManager,
}

impl ValkeyClient {
    /// Create a client from a URL like `redis://localhost:6379`.
    /// Connects eagerly, so a dead backend fails the boot, not the first request.
    pub async fn new(url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn incr_window(&self, key: &str, ttl: Duration) -> CacheResult<WindowHit> {
        // ConnectionManager clones share the underlying connection.
        let mut conn = self.manager.clone();

        // PEXPIRE wants integer milliseconds; clamp to at least 1ms.
        let ttl_millis: u64 = (ttl.as_millis() as u64).max(1);

        let (count, pttl): (u64, i64) = redis::pipe()
            .cmd("INCR")
            .arg(key)
            .cmd("PEXPIRE")
            .arg(key)
            .arg(ttl_millis)
            .arg("NX")
            .ignore()
            .cmd("PTTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        // PTTL returns -1/-2 when the key has no expiry / vanished; treat
        // either as a fresh window.
        let remaining = if pttl > 0 { pttl as u64 } else { ttl_millis };

        Ok(WindowHit {
            count,
            retry_after: Duration::from_millis(remaining),
        })
    }
}
