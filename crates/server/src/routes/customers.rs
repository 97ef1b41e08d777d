use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use models::{Customer, CustomerInput};
use serde::Deserialize;
use tracing::info;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::observability::CUSTOMER_MUTATIONS_TOTAL;
use crate::state::ServerState;

/// Optional `?q=` filter for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseInput {
    pub purchase: String,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Customer>>, JsonApiError> {
    let customers = match params.q.as_deref() {
        Some(term) => state.customers.search(term).await?,
        None => state.customers.list().await?,
    };
    info!(count = customers.len(), query = ?params.q, "list customers");
    Ok(Json(customers))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<CustomerInput>,
) -> Result<(StatusCode, Json<Customer>), JsonApiError> {
    let customer = state.customers.register(input).await?;
    CUSTOMER_MUTATIONS_TOTAL.inc();
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, JsonApiError> {
    state
        .customers
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("Customer not found."))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CustomerInput>,
) -> Result<Json<Customer>, JsonApiError> {
    let customer = state.customers.update(&id, input).await?;
    CUSTOMER_MUTATIONS_TOTAL.inc();
    Ok(Json(customer))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.customers.delete(&id).await?;
    CUSTOMER_MUTATIONS_TOTAL.inc();
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_purchase(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<PurchaseInput>,
) -> Result<Json<Customer>, JsonApiError> {
    let customer = state.customers.add_purchase(&id, &input.purchase).await?;
    CUSTOMER_MUTATIONS_TOTAL.inc();
    Ok(Json(customer))
}
