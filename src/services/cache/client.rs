//! Cache client interface used by higher-level stages (rate limiting).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command).
///
/// Kept independent from `AppError` so callers decide how to fail:
/// the rate limiter fails open, anything auth-critical would fail closed.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// One observation of a fixed-window counter.
#[derive(Debug, Clone, Copy)]
pub struct WindowHit {
    /// How many hits this window has seen, including this one.
    pub count: u64,
    /// Time left until the window resets.
    pub retry_after: Duration,
}

/// A minimal cache interface, just wide enough for fixed-window counting.
///
/// Object-safe on purpose: the backend (redis vs in-process) is a config
/// decision made once at boot, so state holds an `Arc<dyn CacheClient>`.
#[async_trait]
pub trait CacheClient: Send + Sync + 'static {
    /// Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    /// Increment `key` inside a fixed window of `ttl`.
    ///
    /// The first increment of a window starts its clock; later increments
    /// never extend it. Returns the running count and the time remaining.
    async fn incr_window(&self, key: &str, ttl: Duration) -> CacheResult<WindowHit>;
}
