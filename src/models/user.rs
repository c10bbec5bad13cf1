use serde::{Deserialize, Serialize};

/// Public profile shape, never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub fname: String,
    pub lname: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub dob: Option<String>,
    pub role_id: i32,
}

/// Row fetched for credential verification on signin.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialCheck {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub fname: String,
    pub lname: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub dob: Option<String>,
    pub role_id: i32,
}

impl From<CredentialCheck> for UserProfile {
    fn from(user: CredentialCheck) -> Self {
        Self {
            id: user.id,
            email: user.email,
            fname: user.fname,
            lname: user.lname,
            phone: user.phone,
            avatar: user.avatar,
            dob: user.dob,
            role_id: user.role_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub fname: String,
    pub lname: String,
    pub phone: String,
    pub dob: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignoutRequest {
    pub oauth_id: i32,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub id: i32,
    pub access_token: String,
}

/// Profile plus the issued session token, returned on signin.
#[derive(Debug, Serialize)]
pub struct Passport {
    pub user: UserProfile,
    pub token: TokenResponse,
}

/// Partial profile update. Empty strings mean "field not supplied".
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub id: i32,
    pub email: Option<String>,
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}
