use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetail {
    pub card_holder: String,
    pub card_number: String,
    pub expired: String,
    pub cvv: String,
}

#[derive(Debug, Deserialize)]
pub struct AddOrderRequest {
    pub address: Address,
    pub payment_detail: PaymentDetail,
}

#[derive(Debug, Serialize)]
pub struct AddOrderResponse {
    pub order_id: i32,
}

/// Order listing shape; `products` is the cart snapshot taken at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i32,
    pub user_id: i32,
    pub total: Decimal,
    pub status: String,
    pub products: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i32,
    pub user_id: i32,
    pub total: Decimal,
    pub status: String,
    pub products: serde_json::Value,
    pub address: serde_json::Value,
    pub payment_detail: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
