//! HTTP JSON API over the market service.

pub mod error;
mod market;

use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::core::MarketService;

pub struct AppState {
    pub market: MarketService,
}

/// Routes under `/api`, with request tracing.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", market::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `static_dir` for every non-API path, falling back to `index.html`.
pub fn with_static_dir(router: Router, static_dir: &Path) -> Router {
    let index_file = static_dir.join("index.html");
    let static_service = ServeDir::new(static_dir).fallback(ServeFile::new(index_file));
    router.fallback_service(static_service)
}
