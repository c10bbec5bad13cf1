use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        AddProduct, DeleteFileRequest, FileUpload, ImageRes, PaginateRes, Product, ProductFilter,
        UpdateProduct,
    },
    queries::{builders, products_queries},
    services,
    utils::uploads::{check_file_size, rand_file_name, validate_extension},
};

pub async fn search_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<PaginateRes<Product>>> {
    let (products, total) = products_queries::find_products(&state.db, &filter).await?;
    let (page, limit) = builders::effective_page_limit(&filter);

    Ok(Json(PaginateRes::new(products, page, limit, total)))
}

pub async fn find_one_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Product>> {
    let product = products_queries::find_one_product(&state.db, product_id).await?;

    Ok(Json(product))
}

pub async fn find_product_images(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Vec<ImageRes>>> {
    let images = products_queries::find_images_by_product_id(&state.db, product_id).await?;

    Ok(Json(images))
}

/// Raw multipart fields before validation; text fields default to empty.
#[derive(Default)]
struct ProductForm {
    id: String,
    product_title: String,
    product_desc: String,
    product_price: String,
    product_color: String,
    product_size: String,
    product_sex: String,
    product_category: String,
    product_stock: String,
    images: Vec<(String, Vec<u8>)>,
}

async fn collect_product_form(state: &AppState, multipart: &mut Multipart) -> Result<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "images" {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let ext = validate_extension(&original_name)?;
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            check_file_size(data.len(), state.config.storage.file_limit)?;

            form.images.push((ext, data.to_vec()));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        match name.as_str() {
            "id" => form.id = value,
            "product_title" => form.product_title = value,
            "product_desc" => form.product_desc = value,
            "product_price" => form.product_price = value,
            "product_color" => form.product_color = value,
            "product_size" => form.product_size = value,
            "product_sex" => form.product_sex = value,
            "product_category" => form.product_category = value,
            "product_stock" => form.product_stock = value,
            _ => {}
        }
    }

    Ok(form)
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::BadRequest(message.to_string()));
    }
    Ok(())
}

fn parse_price(value: &str) -> Result<Decimal> {
    let price = value
        .parse::<Decimal>()
        .map_err(|_| AppError::BadRequest("invalid product price".to_string()))?;

    if price < Decimal::ZERO {
        return Err(AppError::BadRequest(
            "product price must be greater than 0".to_string(),
        ));
    }

    Ok(price)
}

fn parse_stock(value: &str) -> Result<i32> {
    let stock = value
        .parse::<i32>()
        .map_err(|_| AppError::BadRequest("invalid product stock".to_string()))?;

    if stock < 0 {
        return Err(AppError::BadRequest(
            "product stock must be greater than 0".to_string(),
        ));
    }

    Ok(stock)
}

fn stage_uploads(prefix: &str, images: Vec<(String, Vec<u8>)>) -> Vec<FileUpload> {
    images
        .into_iter()
        .map(|(ext, data)| {
            let filename = rand_file_name(&ext);
            FileUpload {
                destination: format!("{}/{}", prefix, filename),
                filename,
                data,
            }
        })
        .collect()
}

pub async fn add_product(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    let form = collect_product_form(&state, &mut multipart).await?;

    require(&form.product_title, "product_title is required")?;
    require(&form.product_desc, "product_desc is required")?;
    require(&form.product_price, "product_price is required")?;
    require(&form.product_color, "product_color is required")?;
    require(&form.product_size, "product_size is required")?;
    require(&form.product_sex, "product_sex is required")?;
    require(&form.product_category, "product_category is required")?;
    require(&form.product_stock, "product_stock is required")?;

    let product_price = parse_price(&form.product_price)?;
    let product_stock = parse_stock(&form.product_stock)?;

    if form.images.is_empty() {
        return Err(AppError::BadRequest("images is required".to_string()));
    }

    let jobs = stage_uploads(&form.product_title, form.images);
    let images = services::upload_batch(
        state.storage.clone(),
        &state.config.storage.assets_url,
        jobs,
    )
    .await?;

    let req = AddProduct {
        product_title: form.product_title,
        product_desc: form.product_desc,
        product_price,
        product_color: form.product_color,
        product_size: form.product_size,
        product_sex: form.product_sex,
        product_category: form.product_category,
        product_stock,
        images,
    };

    let product = products_queries::insert_product(&state.db, &req).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Multipart partial update: absent fields keep their stored values, a fresh
/// image set replaces the old one.
pub async fn update_product(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Product>> {
    let form = collect_product_form(&state, &mut multipart).await?;

    require(&form.id, "product_id is required")?;
    let product_id = form
        .id
        .parse::<i32>()
        .map_err(|_| AppError::BadRequest("invalid product id".to_string()))?;

    let product_price = if form.product_price.is_empty() {
        None
    } else {
        Some(parse_price(&form.product_price)?)
    };

    let product_stock = if form.product_stock.is_empty() {
        None
    } else {
        Some(parse_stock(&form.product_stock)?)
    };

    let images = if form.images.is_empty() {
        Vec::new()
    } else {
        let jobs = stage_uploads(&form.id, form.images);
        services::upload_batch(
            state.storage.clone(),
            &state.config.storage.assets_url,
            jobs,
        )
        .await?
    };

    let req = UpdateProduct {
        id: product_id,
        product_title: Some(form.product_title),
        product_desc: Some(form.product_desc),
        product_price,
        product_color: Some(form.product_color),
        product_size: Some(form.product_size),
        product_sex: Some(form.product_sex),
        product_category: Some(form.product_category),
        product_stock,
        images,
    };

    let product = products_queries::update_product(&state.db, &req).await?;

    Ok(Json(product))
}

/// Removes the product's stored objects through the delete pool, then the
/// row; image rows go with it via the FK cascade.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<StatusCode> {
    let images = products_queries::find_images_by_product_id(&state.db, product_id).await?;

    let prefix = format!("{}/", state.config.storage.assets_url);
    let requests: Vec<DeleteFileRequest> = images
        .iter()
        .filter_map(|image| {
            image
                .url
                .strip_prefix(&prefix)
                .map(|destination| DeleteFileRequest {
                    destination: destination.to_string(),
                })
        })
        .collect();

    services::delete_batch(state.storage.clone(), requests).await?;

    products_queries::delete_product(&state.db, product_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
