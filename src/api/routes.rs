/*
 * Responsibility
 * - URL structure: /health, /auth/..., /contacts/...
 * - Which stages guard which scope: /auth/me and the contacts routes sit behind
 *   rate limiting and then authentication; account-lifecycle routes and
 *   /health stay open
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{auth, contacts, health::health, users};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    // Layer order: auth first, then the limiter on top, so the limiter runs
    // first on the way in and a throttled caller costs no token check or
    // database read.
    let me = Router::new().route("/auth/me", get(users::me));
    let me = middleware::auth::apply(me, state.clone());
    let me = middleware::rate_limit::apply(me, state.clone());

    let account = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh_token", get(auth::refresh_token))
        .route("/auth/confirmed_email/{token}", get(auth::confirmed_email))
        .route("/auth/request_email", post(auth::request_email));

    let contacts = Router::new()
        .route("/contacts", get(contacts::list).post(contacts::create))
        .route("/contacts/search", get(contacts::search))
        .route("/contacts/birthdays", get(contacts::birthdays))
        .route(
            "/contacts/{contact_id}",
            get(contacts::get)
                .put(contacts::update)
                .delete(contacts::delete),
        );
    let contacts = middleware::auth::apply(contacts, state.clone());
    let contacts = middleware::rate_limit::apply(contacts, state);

    Router::new()
        .route("/health", get(health))
        .merge(me)
        .merge(account)
        .merge(contacts)
}
