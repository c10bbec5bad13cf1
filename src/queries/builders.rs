use sqlx::{Postgres, QueryBuilder};

use crate::models::{FileRes, ProductFilter, ProfileUpdate, UpdateProduct};

const MIN_PAGE: i64 = 1;
const MIN_LIMIT: i64 = 3;

/// Data query head: product rows plus their images as a JSON array, the whole
/// result folded into a single JSON document.
const FIND_PRODUCTS_HEAD: &str = r#"SELECT
    array_to_json(array_agg("t"))
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
    WHERE 1 = 1"#;

const COUNT_PRODUCTS_HEAD: &str = r#"SELECT
    COUNT(*) AS "count"
FROM "products" "p"
WHERE 1 = 1"#;

/// Page/limit with out-of-range values clamped rather than rejected.
pub fn effective_page_limit(filter: &ProductFilter) -> (i64, i64) {
    let page = filter.page.unwrap_or(MIN_PAGE).max(MIN_PAGE);
    let limit = filter.limit.unwrap_or(MIN_LIMIT).max(MIN_LIMIT);
    (page, limit)
}

/// Sort key is restricted to an allow-list; anything else silently falls back
/// to the default ordering.
fn order_clause(filter: &ProductFilter) -> (&'static str, &'static str) {
    let column = match filter
        .order_by
        .as_deref()
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("id") => r#""p"."id""#,
        Some("price") => r#""p"."product_price""#,
        _ => r#""p"."product_title""#,
    };

    let direction = match filter
        .sort
        .as_deref()
        .map(str::to_ascii_uppercase)
        .as_deref()
    {
        Some("DESC") => "DESC",
        _ => "ASC",
    };

    (column, direction)
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a ProductFilter) {
    if let Some(id) = filter.id {
        qb.push("\n    AND \"p\".\"id\" = ");
        qb.push_bind(id);
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let term = format!("%{}%", search.to_lowercase());
        qb.push("\n    AND (LOWER(\"p\".\"product_title\") LIKE ");
        qb.push_bind(term.clone());
        qb.push(" OR LOWER(\"p\".\"product_desc\") LIKE ");
        qb.push_bind(term);
        qb.push(")");
    }
}

/// Builds the paginated data query. Placeholders are emitted strictly
/// left-to-right, so the pagination binds always follow the WHERE binds.
pub fn find_products_query(filter: &ProductFilter) -> QueryBuilder<'_, Postgres> {
    let (page, limit) = effective_page_limit(filter);
    let (column, direction) = order_clause(filter);

    let mut qb = QueryBuilder::new(FIND_PRODUCTS_HEAD);
    push_filters(&mut qb, filter);

    qb.push(format!("\n    ORDER BY {} {}", column, direction));
    qb.push("\n    OFFSET ");
    qb.push_bind((page - 1) * limit);
    qb.push(" LIMIT ");
    qb.push_bind(limit);
    qb.push("\n) AS \"t\"");

    qb
}

/// COUNT variant sharing the data query's WHERE clauses.
pub fn count_products_query(filter: &ProductFilter) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new(COUNT_PRODUCTS_HEAD);
    push_filters(&mut qb, filter);
    qb
}

fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Partial product UPDATE touching only supplied fields. Returns `None` for
/// an empty fieldset so callers can skip the statement entirely.
pub fn update_product_query(req: &UpdateProduct) -> Option<QueryBuilder<'_, Postgres>> {
    let mut qb = QueryBuilder::new(r#"UPDATE "products" SET "#);
    let mut count = 0;

    {
        let mut fields = qb.separated(", ");

        if let Some(title) = supplied(&req.product_title) {
            fields.push(r#""product_title" = "#);
            fields.push_bind_unseparated(title);
            count += 1;
        }
        if let Some(desc) = supplied(&req.product_desc) {
            fields.push(r#""product_desc" = "#);
            fields.push_bind_unseparated(desc);
            count += 1;
        }
        if let Some(price) = req.product_price {
            fields.push(r#""product_price" = "#);
            fields.push_bind_unseparated(price);
            count += 1;
        }
        if let Some(color) = supplied(&req.product_color) {
            fields.push(r#""product_color" = "#);
            fields.push_bind_unseparated(color);
            count += 1;
        }
        if let Some(size) = supplied(&req.product_size) {
            fields.push(r#""product_size" = "#);
            fields.push_bind_unseparated(size);
            count += 1;
        }
        if let Some(sex) = supplied(&req.product_sex) {
            fields.push(r#""product_sex" = "#);
            fields.push_bind_unseparated(sex);
            count += 1;
        }
        if let Some(category) = supplied(&req.product_category) {
            fields.push(r#""product_category" = "#);
            fields.push_bind_unseparated(category);
            count += 1;
        }
        if let Some(stock) = req.product_stock {
            fields.push(r#""product_stock" = "#);
            fields.push_bind_unseparated(stock);
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }

    qb.push(r#" WHERE "id" = "#);
    qb.push_bind(req.id);

    Some(qb)
}

/// Partial user-profile UPDATE, same conventions as the product variant.
pub fn update_profile_query(req: &ProfileUpdate) -> Option<QueryBuilder<'_, Postgres>> {
    let mut qb = QueryBuilder::new(r#"UPDATE "users" SET "#);
    let mut count = 0;

    {
        let mut fields = qb.separated(", ");

        if let Some(email) = supplied(&req.email) {
            fields.push(r#""email" = "#);
            fields.push_bind_unseparated(email);
            count += 1;
        }
        if let Some(fname) = supplied(&req.fname) {
            fields.push(r#""fname" = "#);
            fields.push_bind_unseparated(fname);
            count += 1;
        }
        if let Some(lname) = supplied(&req.lname) {
            fields.push(r#""lname" = "#);
            fields.push_bind_unseparated(lname);
            count += 1;
        }
        if let Some(phone) = supplied(&req.phone) {
            fields.push(r#""phone" = "#);
            fields.push_bind_unseparated(phone);
            count += 1;
        }
        if let Some(avatar) = supplied(&req.avatar) {
            fields.push(r#""avatar" = "#);
            fields.push_bind_unseparated(avatar);
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }

    qb.push(r#" WHERE "id" = "#);
    qb.push_bind(req.id);

    Some(qb)
}

/// Bulk image insert for a product, one VALUES group per file.
pub fn insert_images_query<'a>(
    product_id: i32,
    images: &'a [FileRes],
) -> QueryBuilder<'a, Postgres> {
    let mut qb =
        QueryBuilder::new(r#"INSERT INTO "images" ("filename", "url", "product_id") "#);

    qb.push_values(images, |mut row, image| {
        row.push_bind(&image.filename);
        row.push_bind(&image.url);
        row.push_bind(product_id);
    });

    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn filter(search: Option<&str>, page: Option<i64>, limit: Option<i64>) -> ProductFilter {
        ProductFilter {
            search: search.map(String::from),
            page,
            limit,
            ..ProductFilter::default()
        }
    }

    #[test]
    fn page_and_limit_are_clamped() {
        assert_eq!(effective_page_limit(&filter(None, Some(0), Some(1))), (1, 3));
        assert_eq!(
            effective_page_limit(&filter(None, Some(-5), Some(-5))),
            (1, 3)
        );
        assert_eq!(
            effective_page_limit(&filter(None, Some(4), Some(20))),
            (4, 20)
        );
    }

    #[test]
    fn missing_page_and_limit_use_defaults() {
        assert_eq!(effective_page_limit(&ProductFilter::default()), (1, 3));
    }

    #[test]
    fn undersized_limit_clamps_to_minimum() {
        // search "shirt", page 0, limit 1 -> page 1, limit 3
        let f = filter(Some("shirt"), Some(0), Some(1));
        assert_eq!(effective_page_limit(&f), (1, 3));
    }

    #[test]
    fn unknown_sort_keys_fall_back_to_defaults() {
        let f = ProductFilter {
            order_by: Some("created_at; DROP TABLE products".to_string()),
            sort: Some("sideways".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(order_clause(&f), (r#""p"."product_title""#, "ASC"));
    }

    #[test]
    fn allowed_sort_keys_are_case_insensitive() {
        let f = ProductFilter {
            order_by: Some("PRICE".to_string()),
            sort: Some("Desc".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(order_clause(&f), (r#""p"."product_price""#, "DESC"));
    }

    #[test]
    fn unfiltered_query_binds_only_pagination() {
        let f = ProductFilter::default();
        let qb = find_products_query(&f);
        let sql = qb.sql();

        assert!(sql.starts_with("SELECT\n    array_to_json(array_agg(\"t\"))"));
        assert!(sql.contains("OFFSET $1 LIMIT $2"));
        assert!(sql.ends_with(r#") AS "t""#));
    }

    #[test]
    fn pagination_binds_follow_where_binds() {
        let f = ProductFilter {
            id: Some(9),
            search: Some("shirt".to_string()),
            ..ProductFilter::default()
        };
        let qb = find_products_query(&f);
        let sql = qb.sql();

        let id_pos = sql.find(r#""p"."id" = $1"#).unwrap();
        let title_pos = sql.find(r#"LOWER("p"."product_title") LIKE $2"#).unwrap();
        let desc_pos = sql.find(r#"LOWER("p"."product_desc") LIKE $3"#).unwrap();
        let offset_pos = sql.find("OFFSET $4 LIMIT $5").unwrap();

        assert!(id_pos < title_pos);
        assert!(title_pos < desc_pos);
        assert!(desc_pos < offset_pos);
    }

    #[test]
    fn empty_search_string_adds_no_clause() {
        let f = filter(Some(""), None, None);
        let sql_string = find_products_query(&f).sql().to_string();
        assert!(!sql_string.contains("LIKE"));
        assert!(sql_string.contains("OFFSET $1 LIMIT $2"));
    }

    #[test]
    fn count_query_shares_where_without_pagination() {
        let f = filter(Some("shirt"), Some(2), Some(10));
        let qb = count_products_query(&f);
        let sql = qb.sql();

        assert!(sql.contains("COUNT(*)"));
        assert!(sql.contains("LIKE $1"));
        assert!(sql.contains("LIKE $2"));
        assert!(!sql.contains("OFFSET"));
        assert!(!sql.contains("LIMIT $"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn update_product_emits_one_assignment_per_supplied_field() {
        let req = UpdateProduct {
            id: 5,
            product_title: Some("shirt".to_string()),
            product_stock: Some(12),
            ..UpdateProduct::default()
        };
        let qb = update_product_query(&req).unwrap();

        assert_eq!(
            qb.sql(),
            r#"UPDATE "products" SET "product_title" = $1, "product_stock" = $2 WHERE "id" = $3"#
        );
    }

    #[test]
    fn update_product_with_all_fields_keeps_placeholder_order() {
        let req = UpdateProduct {
            id: 5,
            product_title: Some("shirt".to_string()),
            product_desc: Some("soft".to_string()),
            product_price: Some(Decimal::new(1999, 2)),
            product_color: Some("red".to_string()),
            product_size: Some("M".to_string()),
            product_sex: Some("unisex".to_string()),
            product_category: Some("tops".to_string()),
            product_stock: Some(3),
            images: Vec::new(),
        };
        let qb = update_product_query(&req).unwrap();
        let sql = qb.sql();

        for n in 1..=8 {
            let current = sql.find(&format!("${}", n)).unwrap();
            let next = sql.find(&format!("${}", n + 1)).unwrap();
            assert!(current < next);
        }
        assert!(sql.ends_with(r#"WHERE "id" = $9"#));
    }

    #[test]
    fn update_product_skips_empty_strings() {
        let req = UpdateProduct {
            id: 5,
            product_title: Some(String::new()),
            product_color: Some("black".to_string()),
            ..UpdateProduct::default()
        };
        let qb = update_product_query(&req).unwrap();

        assert_eq!(
            qb.sql(),
            r#"UPDATE "products" SET "product_color" = $1 WHERE "id" = $2"#
        );
    }

    #[test]
    fn update_product_with_no_fields_is_a_noop() {
        let req = UpdateProduct {
            id: 5,
            ..UpdateProduct::default()
        };
        assert!(update_product_query(&req).is_none());
    }

    #[test]
    fn update_profile_builds_subset_assignments() {
        let req = ProfileUpdate {
            id: 7,
            fname: Some("Nino".to_string()),
            phone: Some("599000000".to_string()),
            ..ProfileUpdate::default()
        };
        let qb = update_profile_query(&req).unwrap();

        assert_eq!(
            qb.sql(),
            r#"UPDATE "users" SET "fname" = $1, "phone" = $2 WHERE "id" = $3"#
        );
    }

    #[test]
    fn update_profile_with_no_fields_is_a_noop() {
        let req = ProfileUpdate {
            id: 7,
            email: Some(String::new()),
            ..ProfileUpdate::default()
        };
        assert!(update_profile_query(&req).is_none());
    }

    #[test]
    fn insert_images_emits_one_group_per_image() {
        let images = vec![
            FileRes {
                filename: "a.png".to_string(),
                url: "https://cdn.example.com/p/a.png".to_string(),
            },
            FileRes {
                filename: "b.png".to_string(),
                url: "https://cdn.example.com/p/b.png".to_string(),
            },
        ];
        let qb = insert_images_query(3, &images);

        assert!(qb.sql().contains("($1, $2, $3), ($4, $5, $6)"));
    }
}
