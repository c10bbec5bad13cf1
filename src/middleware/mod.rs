use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    error::AppError,
    queries::user_queries,
    utils::jwt,
};

// Role ids double as bitmask values, so a permitted-roles mask is their sum.
pub const CUSTOMER_ROLE: i32 = 1;
pub const ADMIN_ROLE: i32 = 2;

pub fn role_allowed(role_id: i32, mask: i32) -> bool {
    role_id & mask != 0
}

fn bearer_token(req: &Request) -> Result<&str, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))
}

/// Verifies the bearer JWT and checks the token still exists in the oauth
/// table, so signed-out sessions stop working before the token expires.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)?.to_string();

    let claims = jwt::verify_token(&state.config.jwt, &token)?;

    let user_id = claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::Unauthorized("Invalid token claims".to_string()))?;

    if !user_queries::find_access_token(&state.db, user_id, &token).await? {
        return Err(AppError::Unauthorized("You are not logged in".to_string()));
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

fn claims_from_request(req: &Request) -> Result<&jwt::Claims, AppError> {
    req.extensions()
        .get::<jwt::Claims>()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

pub async fn admin_middleware(req: Request, next: Next) -> Result<Response, AppError> {
    let claims = claims_from_request(&req)?;

    if !role_allowed(claims.role_id, ADMIN_ROLE) {
        return Err(AppError::Unauthorized("no permission to access".to_string()));
    }

    Ok(next.run(req).await)
}

pub async fn customer_middleware(req: Request, next: Next) -> Result<Response, AppError> {
    let claims = claims_from_request(&req)?;

    if !role_allowed(claims.role_id, CUSTOMER_ROLE) {
        return Err(AppError::Unauthorized("no permission to access".to_string()));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_is_denied_admin_endpoints() {
        assert!(!role_allowed(CUSTOMER_ROLE, ADMIN_ROLE));
    }

    #[test]
    fn admin_is_denied_customer_only_endpoints() {
        assert!(!role_allowed(ADMIN_ROLE, CUSTOMER_ROLE));
    }

    #[test]
    fn combined_mask_admits_both_roles() {
        let mask = CUSTOMER_ROLE + ADMIN_ROLE;
        assert!(role_allowed(CUSTOMER_ROLE, mask));
        assert!(role_allowed(ADMIN_ROLE, mask));
    }

    #[test]
    fn zero_role_matches_nothing() {
        assert!(!role_allowed(0, CUSTOMER_ROLE + ADMIN_ROLE));
    }
}
