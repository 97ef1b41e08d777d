use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use common::types::Health;

use crate::observability;
use crate::state::ServerState;

pub mod customers;
pub mod orders;

/// Liveness plus a PING against the store.
pub async fn health(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(Health { status: "ok", store: "up" })),
        Err(e) => {
            warn!(error = %e, "store ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Health { status: "degraded", store: "down" }))
        }
    }
}

async fn metrics() -> (StatusCode, String) {
    observability::encode_metrics()
}

/// Build the full application router
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let customer_routes = Router::new()
        .route("/customers", get(customers::list).post(customers::create))
        .route(
            "/customers/:id",
            get(customers::get).put(customers::update).delete(customers::delete),
        )
        .route("/customers/:id/purchases", post(customers::add_purchase))
        .route("/customers/:id/orders", get(orders::list_for_customer).post(orders::place));

    let order_routes = Router::new()
        .route("/orders", get(orders::list))
        .route("/orders/:number", get(orders::get).put(orders::update).delete(orders::delete));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(customer_routes)
        .merge(order_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
