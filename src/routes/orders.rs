use axum::{
    Extension, Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{AddOrderRequest, AddOrderResponse, OrderDetail, OrderSummary},
    queries::{cart_queries, order_queries},
    utils::{
        extractors::{ensure_owner, extract_user_id},
        jwt::Claims,
    },
};

/// Places an order from the current cart: the cart lines are snapshotted
/// into the order row and the cart is cleared in the same transaction.
pub async fn add_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddOrderRequest>,
) -> Result<Json<AddOrderResponse>> {
    let user_id = extract_user_id(&claims)?;

    let cart = cart_queries::get_cart(&state.db, user_id).await?;

    if cart.is_empty() {
        return Err(AppError::BadRequest("კალათა ცარიელია".to_string()));
    }

    let total: Decimal = cart
        .iter()
        .map(|line| line.product_price * Decimal::from(line.qty))
        .sum();

    let products = serde_json::to_value(&cart)
        .map_err(|e| AppError::InternalError(format!("serialize cart failed: {}", e)))?;
    let address = serde_json::to_value(&payload.address)
        .map_err(|e| AppError::InternalError(format!("serialize address failed: {}", e)))?;
    let payment_detail = serde_json::to_value(&payload.payment_detail)
        .map_err(|e| AppError::InternalError(format!("serialize payment failed: {}", e)))?;

    let order_id = order_queries::add_order(
        &state.db,
        user_id,
        total,
        &products,
        &address,
        &payment_detail,
    )
    .await?;

    Ok(Json(AddOrderResponse { order_id }))
}

pub async fn get_orders(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OrderSummary>>> {
    ensure_owner(&claims, user_id)?;

    let orders = order_queries::get_orders_by_user(&state.db, user_id).await?;

    Ok(Json(orders))
}

pub async fn get_one_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<OrderDetail>> {
    let order = order_queries::get_one_order(&state.db, order_id).await?;

    ensure_owner(&claims, order.user_id)?;

    Ok(Json(order))
}
