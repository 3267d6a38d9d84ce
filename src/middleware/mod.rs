/*
 * Responsibility
 * - Request-pipeline stages: each can short-circuit with a typed AppError
 *   before the handler runs (auth → 401, rate limit → 429)
 * - Transport-level layers (trace/request-id/CORS) live here too
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod rate_limit;
