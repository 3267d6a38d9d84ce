/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Clone-cheap: pools are handles, services sit behind Arc
 */
use std::sync::Arc;

use sqlx::PgPool;

use crate::middleware::rate_limit::RateLimitPolicy;
use crate::services::auth::{JwtCodec, PasswordHasher};
use crate::services::cache::CacheClient;
use crate::services::mail::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: Arc<JwtCodec>,
    pub hasher: Arc<PasswordHasher>,
    pub cache: Arc<dyn CacheClient>,
    pub mailer: Arc<Mailer>,
    pub rate_limit: RateLimitPolicy,
}
