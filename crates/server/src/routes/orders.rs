use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use models::{Order, OrderInput};
use tracing::info;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::customers::SearchParams;
use crate::observability::ORDER_MUTATIONS_TOTAL;
use crate::state::ServerState;

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Order>>, JsonApiError> {
    Ok(Json(state.orders.list_all().await?))
}

/// Orders whose stored `customerId` matches; the customer itself need not exist.
pub async fn list_for_customer(
    State(state): State<ServerState>,
    Path(customer_id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Order>>, JsonApiError> {
    let orders = match params.q.as_deref() {
        Some(term) => state.orders.search_for_customer(&customer_id, term).await?,
        None => state.orders.list_for_customer(&customer_id).await?,
    };
    info!(%customer_id, count = orders.len(), query = ?params.q, "list orders for customer");
    Ok(Json(orders))
}

pub async fn place(
    State(state): State<ServerState>,
    Path(customer_id): Path<String>,
    ApiJson(input): ApiJson<OrderInput>,
) -> Result<(StatusCode, Json<Order>), JsonApiError> {
    let order = state.orders.place(&customer_id, input).await?;
    ORDER_MUTATIONS_TOTAL.inc();
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(number): Path<String>,
) -> Result<Json<Order>, JsonApiError> {
    state
        .orders
        .get(&number)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("Order not found."))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(number): Path<String>,
    ApiJson(input): ApiJson<OrderInput>,
) -> Result<Json<Order>, JsonApiError> {
    let order = state.orders.update(&number, input).await?;
    ORDER_MUTATIONS_TOTAL.inc();
    Ok(Json(order))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(number): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.orders.delete(&number).await?;
    ORDER_MUTATIONS_TOTAL.inc();
    Ok(StatusCode::NO_CONTENT)
}
