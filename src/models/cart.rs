use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ImageRes;

#[derive(Debug, Deserialize)]
pub struct AddCartRequest {
    pub product_id: i32,
    pub size: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartSizeRequest {
    pub user_id: i32,
    pub product_id: i32,
    pub size: String,
}

/// Cart line joined with its product summary; also the per-item shape
/// snapshotted into an order's `products` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i32,
    pub product_id: i32,
    pub size: String,
    pub qty: i32,
    pub product_title: String,
    pub product_price: Decimal,
    pub product_desc: String,
    #[serde(default)]
    pub images: Vec<ImageRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: i32,
    pub product_id: i32,
    pub product_title: String,
    pub product_price: Decimal,
    pub product_size: String,
    #[serde(default)]
    pub images: Vec<ImageRes>,
}
