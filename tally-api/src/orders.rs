use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use tally_orders::models::{OrderStatus, OrderWithProducts};
use tally_orders::pagination::OrderPagination;
use tally_orders::service::{CreateOrder, CreatedOrder, PagedOrders};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", post(create_order).get(list_orders))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/{id}/status", patch(change_order_status))
}

/// POST /v1/orders
/// Create an order and open its payment session
async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrder>,
) -> Result<Json<CreatedOrder>, ApiError> {
    let created = state.orders.create(request).await?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
struct ListOrdersQuery {
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<String>,
}

/// GET /v1/orders
/// Page of raw order rows plus listing metadata
async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<PagedOrders>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let defaults = OrderPagination::default();
    let page = OrderPagination {
        page: query.page.unwrap_or(defaults.page),
        limit: query.limit.unwrap_or(defaults.limit),
        status,
    };

    Ok(Json(state.orders.find_all(page).await?))
}

/// GET /v1/orders/{id}
/// Order with items and live-resolved product names
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderWithProducts>, ApiError> {
    Ok(Json(state.orders.find_one(id).await?))
}

#[derive(Debug, Deserialize)]
struct ChangeOrderStatus {
    status: String,
}

/// PATCH /v1/orders/{id}/status
/// Idempotent when the order is already in the requested status
async fn change_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangeOrderStatus>,
) -> Result<Json<OrderWithProducts>, ApiError> {
    let status = body
        .status
        .parse::<OrderStatus>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(state.orders.change_status(id, status).await?))
}
