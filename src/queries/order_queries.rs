use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{OrderDetail, OrderSummary},
    queries::{READ_TIMEOUT, WRITE_TIMEOUT, with_timeout},
};

/// Inserts the order with its cart snapshot and clears the cart, atomically.
pub async fn add_order(
    pool: &PgPool,
    user_id: i32,
    total: Decimal,
    products: &serde_json::Value,
    address: &serde_json::Value,
    payment_detail: &serde_json::Value,
) -> Result<i32> {
    with_timeout(WRITE_TIMEOUT, "add order", async {
        let mut tx = pool.begin().await?;

        let order_id: i32 = sqlx::query_scalar(
            r#"INSERT INTO "orders" (
                "user_id",
                "total",
                "status",
                "products",
                "address",
                "payment_detail"
            )
            VALUES ($1, $2, 'pending', $3, $4, $5)
            RETURNING "id""#,
        )
        .bind(user_id)
        .bind(total)
        .bind(products)
        .bind(address)
        .bind(payment_detail)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(format!("add order failed: {}", e)))?;

        sqlx::query(r#"DELETE FROM "carts" WHERE "user_id" = $1"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::InternalError(format!("clear cart failed: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(format!("commit add order failed: {}", e)))?;

        Ok(order_id)
    })
    .await
}

pub async fn get_orders_by_user(pool: &PgPool, user_id: i32) -> Result<Vec<OrderSummary>> {
    let raw: serde_json::Value = with_timeout(READ_TIMEOUT, "get orders", async {
        Ok(sqlx::query_scalar(
            r#"SELECT
                COALESCE(array_to_json(array_agg("t")), '[]'::json)
            FROM (
                SELECT
                    "o"."id",
                    "o"."user_id",
                    "o"."total",
                    "o"."status",
                    "o"."products"
                FROM "orders" "o"
                WHERE "o"."user_id" = $1
                ORDER BY "o"."created_at" DESC
            ) AS "t""#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?)
    })
    .await?;

    serde_json::from_value(raw)
        .map_err(|e| AppError::InternalError(format!("unmarshal orders failed: {}", e)))
}

pub async fn get_one_order(pool: &PgPool, order_id: i32) -> Result<OrderDetail> {
    let raw: Option<serde_json::Value> = with_timeout(READ_TIMEOUT, "get one order", async {
        Ok(sqlx::query_scalar(
            r#"SELECT
                to_jsonb("t")
            FROM (
                SELECT
                    "o"."id",
                    "o"."user_id",
                    "o"."total",
                    "o"."status",
                    "o"."products",
                    "o"."address",
                    "o"."payment_detail",
                    "o"."created_at"
                FROM "orders" "o"
                WHERE "o"."id" = $1
            ) AS "t""#,
        )
        .bind(order_id)
        .fetch_optional(pool)
        .await?)
    })
    .await?;

    match raw {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| AppError::InternalError(format!("unmarshal order failed: {}", e))),
        None => Err(AppError::BadRequest("შეკვეთა ვერ მოიძებნა".to_string())),
    }
}
