use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{CartLine, WishlistItem},
    queries::{READ_TIMEOUT, WRITE_TIMEOUT, with_timeout},
};

fn map_fk_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if matches!(db.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
            return AppError::BadRequest("პროდუქტი ვერ მოიძებნა".to_string());
        }
    }
    AppError::DatabaseError(err)
}

/// Adding an already-present (user, product, size) line bumps its qty
/// instead of inserting a duplicate row.
pub async fn add_cart(pool: &PgPool, user_id: i32, product_id: i32, size: &str) -> Result<i32> {
    with_timeout(WRITE_TIMEOUT, "add cart", async {
        sqlx::query_scalar(
            r#"INSERT INTO "carts" ("user_id", "product_id", "size", "qty")
            VALUES ($1, $2, $3, 1)
            ON CONFLICT ("user_id", "product_id", "size")
            DO UPDATE SET "qty" = "carts"."qty" + 1
            RETURNING "qty""#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(size)
        .fetch_one(pool)
        .await
        .map_err(map_fk_violation)
    })
    .await
}

pub async fn remove_cart(pool: &PgPool, user_id: i32, product_id: i32) -> Result<()> {
    with_timeout(WRITE_TIMEOUT, "remove cart", async {
        sqlx::query(r#"DELETE FROM "carts" WHERE "user_id" = $1 AND "product_id" = $2"#)
            .bind(user_id)
            .bind(product_id)
            .execute(pool)
            .await
            .map_err(|e| AppError::InternalError(format!("remove cart failed: {}", e)))?;
        Ok(())
    })
    .await
}

pub async fn get_cart(pool: &PgPool, user_id: i32) -> Result<Vec<CartLine>> {
    let raw: serde_json::Value = with_timeout(READ_TIMEOUT, "get cart", async {
        Ok(sqlx::query_scalar(
            r#"SELECT
                COALESCE(array_to_json(array_agg("t")), '[]'::json)
            FROM (
                SELECT
                    "c"."id",
                    "c"."product_id",
                    "c"."size",
                    "c"."qty",
                    "p"."product_title",
                    "p"."product_price",
                    "p"."product_desc",
                    (
                        SELECT
                            COALESCE(array_to_json(array_agg("it")), '[]'::json)
                        FROM (
                            SELECT
                                "i"."id",
                                "i"."filename",
                                "i"."url"
                            FROM "images" "i"
                            WHERE "i"."product_id" = "p"."id"
                        ) AS "it"
                    ) AS "images"
                FROM "carts" "c"
                JOIN "products" "p" ON "c"."product_id" = "p"."id"
                WHERE "c"."user_id" = $1
            ) AS "t""#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?)
    })
    .await?;

    serde_json::from_value(raw)
        .map_err(|e| AppError::InternalError(format!("unmarshal cart failed: {}", e)))
}

pub async fn increase_qty(pool: &PgPool, user_id: i32, product_id: i32) -> Result<i32> {
    let qty: Option<i32> = with_timeout(WRITE_TIMEOUT, "increase cart qty", async {
        Ok(sqlx::query_scalar(
            r#"UPDATE "carts" SET "qty" = "qty" + 1
            WHERE "user_id" = $1 AND "product_id" = $2
            RETURNING "qty""#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(pool)
        .await?)
    })
    .await?;

    qty.ok_or_else(|| AppError::BadRequest("კალათის ჩანაწერი ვერ მოიძებნა".to_string()))
}

/// Quantity never drops below one; removing the line is a separate call.
pub async fn decrease_qty(pool: &PgPool, user_id: i32, product_id: i32) -> Result<i32> {
    let qty: Option<i32> = with_timeout(WRITE_TIMEOUT, "decrease cart qty", async {
        Ok(sqlx::query_scalar(
            r#"UPDATE "carts" SET "qty" = GREATEST("qty" - 1, 1)
            WHERE "user_id" = $1 AND "product_id" = $2
            RETURNING "qty""#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(pool)
        .await?)
    })
    .await?;

    qty.ok_or_else(|| AppError::BadRequest("კალათის ჩანაწერი ვერ მოიძებნა".to_string()))
}

pub async fn update_size(
    pool: &PgPool,
    user_id: i32,
    product_id: i32,
    size: &str,
) -> Result<String> {
    let updated: Option<String> = with_timeout(WRITE_TIMEOUT, "update cart size", async {
        Ok(sqlx::query_scalar(
            r#"UPDATE "carts" SET "size" = $3
            WHERE "user_id" = $1 AND "product_id" = $2
            RETURNING "size""#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(size)
        .fetch_optional(pool)
        .await?)
    })
    .await?;

    updated.ok_or_else(|| AppError::BadRequest("კალათის ჩანაწერი ვერ მოიძებნა".to_string()))
}

pub async fn check_wishlist(pool: &PgPool, user_id: i32, product_id: i32) -> Result<bool> {
    let check: bool = sqlx::query_scalar(
        r#"SELECT
            (CASE WHEN COUNT(*) = 1 THEN TRUE ELSE FALSE END)
        FROM "wishlists"
        WHERE "user_id" = $1
        AND "product_id" = $2"#,
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_one(pool)
    .await?;

    Ok(check)
}

pub async fn add_wishlist(pool: &PgPool, user_id: i32, product_id: i32) -> Result<()> {
    with_timeout(WRITE_TIMEOUT, "add wishlist", async {
        sqlx::query(r#"INSERT INTO "wishlists" ("user_id", "product_id") VALUES ($1, $2)"#)
            .bind(user_id)
            .bind(product_id)
            .execute(pool)
            .await
            .map_err(map_fk_violation)?;
        Ok(())
    })
    .await
}

pub async fn remove_wishlist(pool: &PgPool, user_id: i32, product_id: i32) -> Result<()> {
    with_timeout(WRITE_TIMEOUT, "remove wishlist", async {
        sqlx::query(r#"DELETE FROM "wishlists" WHERE "user_id" = $1 AND "product_id" = $2"#)
            .bind(user_id)
            .bind(product_id)
            .execute(pool)
            .await
            .map_err(|e| AppError::InternalError(format!("remove wishlist failed: {}", e)))?;
        Ok(())
    })
    .await
}

pub async fn find_wishlist(pool: &PgPool, user_id: i32) -> Result<Vec<WishlistItem>> {
    let raw: serde_json::Value = with_timeout(READ_TIMEOUT, "find wishlist", async {
        Ok(sqlx::query_scalar(
            r#"SELECT
                COALESCE(array_to_json(array_agg("t")), '[]'::json)
            FROM (
                SELECT
                    "wl"."id",
                    "wl"."product_id",
                    "p"."product_title",
                    "p"."product_price",
                    "p"."product_size",
                    (
                        SELECT
                            COALESCE(array_to_json(array_agg("it")), '[]'::json)
                        FROM (
                            SELECT
                                "i"."id",
                                "i"."filename",
                                "i"."url"
                            FROM "images" "i"
                            WHERE "i"."product_id" = "p"."id"
                        ) AS "it"
                    ) AS "images"
                FROM "wishlists" "wl"
                JOIN "products" "p" ON "wl"."product_id" = "p"."id"
                WHERE "wl"."user_id" = $1
            ) AS "t""#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?)
    })
    .await?;

    serde_json::from_value(raw)
        .map_err(|e| AppError::InternalError(format!("unmarshal wishlist failed: {}", e)))
}
