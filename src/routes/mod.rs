mod cart;
mod files;
mod health;
mod orders;
mod products;
mod users;
mod wishlist;

use axum::{
    Router,
    handler::Handler,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post},
};

use crate::{
    AppState,
    error::AppError,
    middleware::{admin_middleware, auth_middleware, customer_middleware},
};

pub fn create_router(state: &AppState) -> Router<AppState> {
    // DELETE shares its path with the public product fetch, so the admin
    // guards are attached to the handler itself.
    let delete_product = products::delete_product
        .layer(from_fn(admin_middleware))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let public = Router::new()
        .route("/", get(health::monitor))
        .route("/health", get(health::readiness_check))
        .route("/users/signup", post(users::signup))
        .route("/users/signin", post(users::signin))
        .route("/product/search", get(products::search_products))
        .route(
            "/product/{product_id}",
            get(products::find_one_product).delete(delete_product),
        )
        .route("/product/image/{product_id}", get(products::find_product_images));

    let protected = Router::new()
        .route("/users/signout", post(users::signout))
        .route(
            "/users/{user_id}",
            get(users::get_profile).put(users::update_profile),
        )
        .route(
            "/users/{user_id}/wishlist/{product_id}",
            post(wishlist::toggle_wishlist),
        )
        .route("/users/wishlist/{user_id}", get(wishlist::get_wishlist))
        .route(
            "/users/cart/{user_id}",
            post(cart::add_cart).get(cart::get_cart),
        )
        .route("/users/cart/size", patch(cart::update_cart_size))
        .route(
            "/users/cart/{user_id}/{product_id}",
            delete(cart::remove_cart),
        )
        .route(
            "/users/cart/{user_id}/{product_id}/increase",
            patch(cart::increase_qty),
        )
        .route(
            "/users/cart/{user_id}/{product_id}/decrease",
            patch(cart::decrease_qty),
        )
        .route("/order/one/{order_id}", get(orders::get_one_order))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let admin = Router::new()
        .route("/users/signup-admin", post(users::signup_admin))
        .route(
            "/product",
            post(products::add_product).put(products::update_product),
        )
        .route("/files/upload", post(files::upload_files))
        .route("/files/delete", patch(files::delete_files))
        .route_layer(from_fn(admin_middleware))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let customer = Router::new()
        .route("/order", post(orders::add_order))
        .route("/order/{user_id}", get(orders::get_orders))
        .route_layer(from_fn(customer_middleware))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", public.merge(protected).merge(admin).merge(customer))
        .fallback(router_check)
}

async fn router_check() -> AppError {
    AppError::NotFound("router not found".to_string())
}
