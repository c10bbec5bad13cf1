use crate::{
    error::{AppError, Result},
    middleware::{ADMIN_ROLE, role_allowed},
    utils::jwt::Claims,
};

pub fn extract_user_id(claims: &Claims) -> Result<i32> {
    claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::Unauthorized("Unauthorized".to_string()))
}

/// Path-parameter ownership check: admins pass, everyone else must match.
pub fn ensure_owner(claims: &Claims, user_id: i32) -> Result<()> {
    if role_allowed(claims.role_id, ADMIN_ROLE) {
        return Ok(());
    }

    if extract_user_id(claims)? != user_id {
        return Err(AppError::Unauthorized("no permission to access".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{ADMIN_ROLE, CUSTOMER_ROLE};

    fn claims(sub: &str, role_id: i32) -> Claims {
        Claims {
            sub: sub.to_string(),
            role_id,
            exp: 0,
        }
    }

    #[test]
    fn owner_can_access_own_resource() {
        assert!(ensure_owner(&claims("7", CUSTOMER_ROLE), 7).is_ok());
    }

    #[test]
    fn customer_cannot_access_other_users() {
        assert!(ensure_owner(&claims("7", CUSTOMER_ROLE), 8).is_err());
    }

    #[test]
    fn admin_can_access_any_user() {
        assert!(ensure_owner(&claims("1", ADMIN_ROLE), 8).is_ok());
    }

    #[test]
    fn malformed_subject_is_rejected() {
        assert!(extract_user_id(&claims("not-a-number", CUSTOMER_ROLE)).is_err());
    }
}
