//! Rate-limit stage: fixed-window counting per caller address and path.
//!
//! Runs ahead of authentication, so an exhausted caller gets 429 without
//! costing a token verification or a database read. The window lives in the
//! cache backend (`INCR` + `PEXPIRE NX` semantics); a broken backend fails
//! open with a warning rather than taking the API down.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    /// Requests admitted per window.
    pub times: u64,
    pub window: Duration,
}

/// Apply the fixed-window limiter to every route in `router`.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, fixed_window))
}

async fn fixed_window(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!("rl:{}:{}", caller_key(&req), req.uri().path());

    match state.cache.incr_window(&key, state.rate_limit.window).await {
        Ok(hit) if hit.count > state.rate_limit.times => {
            // Round the remaining window up to whole seconds for Retry-After.
            let retry_after = ((hit.retry_after.as_millis() as u64) + 999) / 1000;
            Err(AppError::TooManyRequests {
                retry_after: retry_after.max(1),
            })
        }
        Ok(_) => Ok(next.run(req).await),
        Err(err) => {
            tracing::warn!(
                backend = state.cache.backend_name(),
                error = %err,
                "rate-limit backend unavailable; admitting request"
            );
            Ok(next.run(req).await)
        }
    }
}

/// Identify the caller: first hop of x-forwarded-for when present (the
/// deployment sits behind a proxy), otherwise the peer address.
fn caller_key(req: &Request<Body>) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_forwarded(value: &str) -> Request<Body> {
        Request::builder()
            .uri("/auth/me")
            .header("x-forwarded-for", value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn forwarded_header_wins() {
        let req = request_with_forwarded("203.0.113.9, 10.0.0.1");
        assert_eq!(caller_key(&req), "203.0.113.9");
    }

    #[test]
    fn falls_back_to_connect_info() {
        let mut req = Request::builder()
            .uri("/auth/me")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("192.0.2.4:5000".parse().unwrap()));
        assert_eq!(caller_key(&req), "192.0.2.4");
    }

    #[test]
    fn unknown_without_any_source() {
        let req = Request::builder()
            .uri("/auth/me")
            .body(Body::empty())
            .unwrap();
        assert_eq!(caller_key(&req), "unknown");
    }
}
