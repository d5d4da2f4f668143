use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{ops_handlers, query_handlers, search_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/search/item", post(search_handlers::search_item))
        .route("/api/search/query", post(search_handlers::search_query))
        .route("/api/search/fetch", post(search_handlers::fetch_listings))
        .route("/api/query/validate", post(query_handlers::validate_query))
        .route(
            "/api/catalog/categories",
            get(query_handlers::list_categories),
        )
        .route("/api/ops/health/live", get(ops_handlers::health_live))
        .route(
            "/api/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
