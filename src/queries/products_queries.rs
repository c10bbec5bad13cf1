use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{AddProduct, ImageRes, Product, ProductFilter, UpdateProduct},
    queries::{READ_TIMEOUT, WRITE_TIMEOUT, builders, with_timeout},
};

pub async fn find_one_product(pool: &PgPool, product_id: i32) -> Result<Product> {
    let raw: Option<serde_json::Value> = with_timeout(READ_TIMEOUT, "find one product", async {
        Ok(sqlx::query_scalar(
            r#"SELECT
                to_jsonb("t")
            FROM (
                SELECT
                    "p"."id",
                    "p"."product_title",
                    "p"."product_desc",
                    "p"."product_price",
                    "p"."product_color",
                    "p"."product_size",
                    "p"."product_sex",
                    "p"."product_category",
                    "p"."product_stock",
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
                FROM "products" "p"
                WHERE "p"."id" = $1
                LIMIT 1
            ) AS "t""#,
        )
        .bind(product_id)
        .fetch_optional(pool)
        .await?)
    })
    .await?;

    match raw {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| AppError::InternalError(format!("unmarshal product failed: {}", e))),
        None => Err(AppError::BadRequest("პროდუქტი ვერ მოიძებნა".to_string())),
    }
}

/// Builder-driven search: one filter state produces the JSON data query and
/// the COUNT query for the pagination envelope.
pub async fn find_products(pool: &PgPool, filter: &ProductFilter) -> Result<(Vec<Product>, i64)> {
    let raw: Option<serde_json::Value> = with_timeout(READ_TIMEOUT, "find products", async {
        let mut data_query = builders::find_products_query(filter);
        Ok(data_query.build_query_scalar().fetch_one(pool).await?)
    })
    .await?;

    let products = match raw {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| AppError::InternalError(format!("unmarshal products failed: {}", e)))?,
        None => Vec::new(),
    };

    let total: i64 = with_timeout(READ_TIMEOUT, "count products", async {
        let mut count_query = builders::count_products_query(filter);
        Ok(count_query.build_query_scalar().fetch_one(pool).await?)
    })
    .await?;

    Ok((products, total))
}

pub async fn find_images_by_product_id(pool: &PgPool, product_id: i32) -> Result<Vec<ImageRes>> {
    let images = sqlx::query_as::<_, ImageRes>(
        r#"SELECT "id", "filename", "url" FROM "images" WHERE "product_id" = $1"#,
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(images)
}

/// Product row and its image rows are inserted in one transaction; any
/// failure rolls the whole thing back.
pub async fn insert_product(pool: &PgPool, req: &AddProduct) -> Result<Product> {
    let product_id = with_timeout(WRITE_TIMEOUT, "insert product", async {
        let mut tx = pool.begin().await?;

        let product_id: i32 = sqlx::query_scalar(
            r#"INSERT INTO "products" (
                "product_title",
                "product_desc",
                "product_price",
                "product_color",
                "product_size",
                "product_sex",
                "product_category",
                "product_stock"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING "id""#,
        )
        .bind(&req.product_title)
        .bind(&req.product_desc)
        .bind(req.product_price)
        .bind(&req.product_color)
        .bind(&req.product_size)
        .bind(&req.product_sex)
        .bind(&req.product_category)
        .bind(req.product_stock)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::InternalError(format!("insert product failed: {}", e)))?;

        if !req.images.is_empty() {
            builders::insert_images_query(product_id, &req.images)
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::InternalError(format!("insert images failed: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(format!("commit failed: {}", e)))?;

        Ok(product_id)
    })
    .await?;

    find_one_product(pool, product_id).await
}

/// Partial update; a non-empty image set replaces the stored rows inside the
/// same transaction. With nothing supplied at all this degrades to a fetch.
pub async fn update_product(pool: &PgPool, req: &UpdateProduct) -> Result<Product> {
    with_timeout(WRITE_TIMEOUT, "update product", async {
        let mut tx = pool.begin().await?;

        if let Some(mut query) = builders::update_product_query(req) {
            query
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::InternalError(format!("update product failed: {}", e)))?;
        }

        if !req.images.is_empty() {
            sqlx::query(r#"DELETE FROM "images" WHERE "product_id" = $1"#)
                .bind(req.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::InternalError(format!("delete images failed: {}", e)))?;

            builders::insert_images_query(req.id, &req.images)
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::InternalError(format!("insert images failed: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::InternalError(format!("commit failed: {}", e)))?;

        Ok(())
    })
    .await?;

    find_one_product(pool, req.id).await
}

pub async fn delete_product(pool: &PgPool, product_id: i32) -> Result<()> {
    with_timeout(READ_TIMEOUT, "delete product", async {
        sqlx::query(r#"DELETE FROM "products" WHERE "id" = $1"#)
            .bind(product_id)
            .execute(pool)
            .await
            .map_err(|e| AppError::InternalError(format!("delete product failed: {}", e)))?;
        Ok(())
    })
    .await
}
