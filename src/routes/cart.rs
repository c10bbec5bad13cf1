use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{AddCartRequest, CartLine, UpdateCartSizeRequest},
    queries::cart_queries,
    utils::{extractors::ensure_owner, jwt::Claims},
};

pub async fn add_cart(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddCartRequest>,
) -> Result<Json<serde_json::Value>> {
    ensure_owner(&claims, user_id)?;

    if payload.size.trim().is_empty() {
        return Err(AppError::BadRequest("ზომა აუცილებელია".to_string()));
    }

    let qty = cart_queries::add_cart(&state.db, user_id, payload.product_id, &payload.size).await?;

    Ok(Json(json!({ "qty": qty })))
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<CartLine>>> {
    ensure_owner(&claims, user_id)?;

    let cart = cart_queries::get_cart(&state.db, user_id).await?;

    Ok(Json(cart))
}

pub async fn remove_cart(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(i32, i32)>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode> {
    ensure_owner(&claims, user_id)?;

    cart_queries::remove_cart(&state.db, user_id, product_id).await?;

    Ok(StatusCode::OK)
}

pub async fn increase_qty(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(i32, i32)>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>> {
    ensure_owner(&claims, user_id)?;

    let qty = cart_queries::increase_qty(&state.db, user_id, product_id).await?;

    Ok(Json(json!({ "qty": qty })))
}

pub async fn decrease_qty(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(i32, i32)>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>> {
    ensure_owner(&claims, user_id)?;

    let qty = cart_queries::decrease_qty(&state.db, user_id, product_id).await?;

    Ok(Json(json!({ "qty": qty })))
}

pub async fn update_cart_size(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateCartSizeRequest>,
) -> Result<Json<serde_json::Value>> {
    ensure_owner(&claims, payload.user_id)?;

    if payload.size.trim().is_empty() {
        return Err(AppError::BadRequest("ზომა აუცილებელია".to_string()));
    }

    let size = cart_queries::update_size(
        &state.db,
        payload.user_id,
        payload.product_id,
        &payload.size,
    )
    .await?;

    Ok(Json(json!({ "size": size })))
}
