/*
 * Responsibility
 * - Config load → dependency construction → Router assembly
 * - Tracing and panic-hook setup
 * - axum::serve() with per-connection peer addresses (the limiter keys on them)
 */
use std::net::SocketAddr;
use std::sync::Arc;
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::rate_limit::RateLimitPolicy;
use crate::middleware::{cors, http};
use crate::services::auth::{JwtCodec, PasswordHasher};
use crate::services::cache::{CacheClient, MemoryClient, ValkeyClient};
use crate::services::mail::Mailer;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise a sensible default.
    // Ex: RUST_LOG=info,contacts_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints location/payload to stderr).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing so they don't get lost when stderr is
        // swallowed by the process supervisor.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            // Development: fail fast so the panic is impossible to miss.
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting contacts-api in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to postgres")?;

    sqlx::migrate!()
        .run(&db)
        .await
        .context("failed to run migrations")?;

    let cache: Arc<dyn CacheClient> = match &config.redis_url {
        Some(url) => Arc::new(
            ValkeyClient::new(url)
                .await
                .context("failed to connect to redis")?,
        ),
        None => {
            tracing::warn!("REDIS_URL not set; rate-limit counters are in-process only");
            Arc::new(MemoryClient::new())
        }
    };

    Ok(AppState {
        db,
        tokens: Arc::new(JwtCodec::new(
            &config.jwt_secret,
            config.access_token_ttl_seconds,
            config.refresh_token_ttl_seconds,
            config.email_token_ttl_seconds,
        )),
        hasher: Arc::new(PasswordHasher::new()),
        cache,
        mailer: Arc::new(Mailer::from_config(config).context("failed to build mail client")?),
        rate_limit: RateLimitPolicy {
            times: config.rate_limit_times,
            window: config.rate_limit_window,
        },
    })
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(state.clone()).with_state(state);
    let router = cors::apply(router, config);
    http::apply(router)
}
