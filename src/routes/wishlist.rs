use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::json;

use crate::{
    AppState,
    error::Result,
    models::WishlistItem,
    queries::cart_queries,
    utils::{extractors::ensure_owner, jwt::Claims},
};

/// Toggle: a product already on the wishlist is removed, otherwise added.
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(i32, i32)>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>> {
    ensure_owner(&claims, user_id)?;

    let exists = cart_queries::check_wishlist(&state.db, user_id, product_id).await?;

    if exists {
        cart_queries::remove_wishlist(&state.db, user_id, product_id).await?;
    } else {
        cart_queries::add_wishlist(&state.db, user_id, product_id).await?;
    }

    Ok(Json(json!({ "in_wishlist": !exists })))
}

pub async fn get_wishlist(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<WishlistItem>>> {
    ensure_owner(&claims, user_id)?;

    let wishlist = cart_queries::find_wishlist(&state.db, user_id).await?;

    Ok(Json(wishlist))
}
