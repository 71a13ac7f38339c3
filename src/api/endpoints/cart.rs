//! Cart and mock checkout endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::cart::{CartView, OrderReceipt};

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub medication_id: Uuid,
}

/// `GET /api/cart` — current cart contents and total.
pub async fn view(State(ctx): State<ApiContext>) -> Result<Json<CartView>, ApiError> {
    Ok(Json(ctx.core.cart_view()?))
}

/// `POST /api/cart/items` — add one refill of a stored medication.
pub async fn add_item(
    State(ctx): State<ApiContext>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(ctx.core.add_to_cart(&req.medication_id)?))
}

/// `DELETE /api/cart/items/:medication_id` — drop a whole line.
pub async fn remove_item(
    State(ctx): State<ApiContext>,
    Path(medication_id): Path<Uuid>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(ctx.core.remove_from_cart(&medication_id)?))
}

/// `DELETE /api/cart` — empty the cart.
pub async fn clear(State(ctx): State<ApiContext>) -> Result<Json<CartView>, ApiError> {
    Ok(Json(ctx.core.clear_cart()?))
}

/// `POST /api/cart/checkout` — run the mock checkout.
///
/// Holds for the configured delay before clearing the cart, so the UI
/// gets its processing state. One checkout at a time; a racing second
/// request gets 409 rather than a queue.
pub async fn checkout(State(ctx): State<ApiContext>) -> Result<Json<OrderReceipt>, ApiError> {
    Ok(Json(ctx.core.checkout().await?))
}
