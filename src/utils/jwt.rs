use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::JwtConfig,
    error::{AppError, Result},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role_id: i32,
    pub exp: usize,
}

pub fn generate_token(config: &JwtConfig, user_id: i32, role_id: i32) -> Result<String> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(config.access_expires))
        .ok_or_else(|| AppError::InternalError("Failed to calculate expiration".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        role_id,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Token generation failed: {}", e)))
}

pub fn verify_token(config: &JwtConfig, token: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token is expired".to_string())
        }
        _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_expires: 3600,
        }
    }

    #[test]
    fn sign_then_verify_round_trips_claims() {
        let config = test_config();
        let token = generate_token(&config, 42, 2).unwrap();
        let claims = verify_token(&config, &token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role_id, 2);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let config = test_config();
        let mut token = generate_token(&config, 42, 1).unwrap();
        token.push('x');

        assert!(verify_token(&config, &token).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let token = generate_token(&config, 42, 1).unwrap();

        let other = JwtConfig {
            secret: "other-secret".to_string(),
            access_expires: 3600,
        };
        assert!(verify_token(&other, &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig {
            secret: "test-secret".to_string(),
            access_expires: -3600,
        };
        let token = generate_token(&config, 42, 1).unwrap();

        assert!(verify_token(&config, &token).is_err());
    }
}
