use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::FileRes;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ImageRes {
    pub id: i32,
    pub filename: String,
    pub url: String,
}

/// Product as served to clients, decoded from the JSON-aggregation queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub product_title: String,
    pub product_desc: String,
    pub product_price: Decimal,
    pub product_color: String,
    pub product_size: String,
    pub product_sex: String,
    pub product_category: String,
    pub product_stock: i32,
    #[serde(default)]
    pub images: Vec<ImageRes>,
}

#[derive(Debug)]
pub struct AddProduct {
    pub product_title: String,
    pub product_desc: String,
    pub product_price: Decimal,
    pub product_color: String,
    pub product_size: String,
    pub product_sex: String,
    pub product_category: String,
    pub product_stock: i32,
    pub images: Vec<FileRes>,
}

/// Partial product update. `None` (or an empty string) means "leave as is";
/// a non-empty `images` set replaces the stored image rows.
#[derive(Debug, Default)]
pub struct UpdateProduct {
    pub id: i32,
    pub product_title: Option<String>,
    pub product_desc: Option<String>,
    pub product_price: Option<Decimal>,
    pub product_color: Option<String>,
    pub product_size: Option<String>,
    pub product_sex: Option<String>,
    pub product_category: Option<String>,
    pub product_stock: Option<i32>,
    pub images: Vec<FileRes>,
}

/// Query-string filter for product search.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub id: Option<i32>,
    pub search: Option<String>,
    pub order_by: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
