pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod startup;
pub mod store;
pub mod translate;
pub mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::services::{Reconciler, TranslationService};
use crate::store::TransactionStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TransactionStore>,
    pub reconciler: Reconciler,
    pub translator: TranslationService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        translator: TranslationService,
        callback_scan_limit: i64,
    ) -> Self {
        let reconciler = Reconciler::new(store.clone(), callback_scan_limit);
        Self {
            store,
            reconciler,
            translator,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/payments/callback", post(handlers::payments::callback))
        .route(
            "/payments/transactions",
            post(handlers::payments::create_transaction).get(handlers::payments::list_transactions),
        )
        .route(
            "/payments/transactions/:id",
            get(handlers::payments::get_transaction),
        )
        .route("/translate", post(handlers::translate::translate))
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        // The marketing site calls these endpoints cross-origin; the CORS
        // layer also answers OPTIONS preflight.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
