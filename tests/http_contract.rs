//! Router-level contract tests for the request pipeline.
//!
//! The interesting behaviors here are the ones that must happen *before* a
//! handler runs: missing/invalid credentials answer 401, the fourth call in
//! a window answers 429, malformed payloads answer 400. None of these paths
//! touch the database, so the pool is lazy and never connects.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use contacts_api::api;
use contacts_api::middleware::rate_limit::RateLimitPolicy;
use contacts_api::services::auth::{JwtCodec, PasswordHasher, TokenScope};
use contacts_api::services::cache::MemoryClient;
use contacts_api::services::mail::Mailer;
use contacts_api::state::AppState;

const TEST_SECRET: &str = "test-secret";

fn test_state() -> AppState {
    let db = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@127.0.0.1:1/never-connected")
        .expect("lazy pool");

    AppState {
        db,
        tokens: Arc::new(JwtCodec::new(TEST_SECRET, 900, 604_800, 604_800)),
        hasher: Arc::new(PasswordHasher::new()),
        cache: Arc::new(MemoryClient::new()),
        mailer: Arc::new(Mailer::disabled()),
        rate_limit: RateLimitPolicy {
            times: 3,
            window: Duration::from_secs(60),
        },
    }
}

fn test_router() -> Router {
    let state = test_state();
    api::routes(state.clone()).with_state(state)
}

async fn send(router: &Router, req: Request<Body>) -> Response<Body> {
    router.clone().oneshot(req).await.expect("infallible")
}

fn get_me(ip: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri("/auth/me")
        .header("x-forwarded-for", ip);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_is_open() {
    let router = test_router();
    let res = send(
        &router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn me_rejects_missing_credentials() {
    let router = test_router();
    let res = send(&router, get_me("198.51.100.1", None)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_rejects_garbage_tokens() {
    let router = test_router();
    let res = send(&router, get_me("198.51.100.2", Some("not-a-jwt"))).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_rejects_tokens_of_the_wrong_scope() {
    let router = test_router();
    let codec = JwtCodec::new(TEST_SECRET, 900, 900, 900);
    let refresh = codec.issue("a@example.com", TokenScope::Refresh).unwrap();

    let res = send(&router, get_me("198.51.100.3", Some(&refresh))).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fourth_call_in_the_window_is_throttled() {
    let router = test_router();

    for _ in 0..3 {
        let res = send(&router, get_me("203.0.113.7", None)).await;
        // Under the limit: the auth stage answers, not the limiter.
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    let res = send(&router, get_me("203.0.113.7", None)).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = res
        .headers()
        .get(header::RETRY_AFTER)
        .expect("Retry-After header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
}

#[tokio::test]
async fn windows_are_per_caller() {
    let router = test_router();

    for _ in 0..3 {
        send(&router, get_me("203.0.113.8", None)).await;
    }

    // A different caller still has a fresh window.
    let res = send(&router, get_me("203.0.113.9", None)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn contacts_require_credentials() {
    let router = test_router();
    let res = send(
        &router,
        Request::builder()
            .uri("/contacts")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_validates_before_touching_the_db() {
    let router = test_router();
    let res = send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/auth/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"username": "  ", "email": "a@example.com", "password": "123456789"}"#,
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_requires_a_refresh_scoped_token() {
    let router = test_router();
    let codec = JwtCodec::new(TEST_SECRET, 900, 900, 900);
    let access = codec.issue("a@example.com", TokenScope::Access).unwrap();

    let res = send(
        &router,
        Request::builder()
            .uri("/auth/refresh_token")
            .header(header::AUTHORIZATION, format!("Bearer {access}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn confirmation_with_a_bogus_token_is_a_bad_request() {
    let router = test_router();
    let res = send(
        &router,
        Request::builder()
            .uri("/auth/confirmed_email/not-a-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
