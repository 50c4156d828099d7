use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::JwtVerifier;
use crate::db::ledger_repository::LedgerRepository;
use crate::db::repository::StatsRepository;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub stats_repo: Arc<dyn StatsRepository>,
    pub ledger_repo: Arc<dyn LedgerRepository>,
    pub jwt: Arc<JwtVerifier>,
}

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/admin/stats",
            get(api::admin::stats_handler).fallback(api::admin::method_not_allowed),
        )
        .route("/api/token/balance", get(api::wallet::balance_handler))
        .route(
            "/api/token/transactions",
            get(api::wallet::transactions_handler),
        )
        .route("/api/token/earn", post(api::wallet::earn_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
