use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{CredentialCheck, ProfileUpdate, RegisterRequest, UserProfile},
    queries::{WRITE_TIMEOUT, builders, with_timeout},
};

const PROFILE_COLUMNS: &str =
    r#""id", "email", "fname", "lname", "phone", "avatar", "dob", "role_id""#;

fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        match db.constraint() {
            Some("users_email_key") => {
                return AppError::BadRequest("ელფოსტა უკვე გამოყენებულია".to_string());
            }
            Some("users_phone_key") => {
                return AppError::BadRequest("ტელეფონის ნომერი უკვე გამოყენებულია".to_string());
            }
            _ => {}
        }
    }
    AppError::DatabaseError(err)
}

pub async fn insert_user(
    pool: &PgPool,
    req: &RegisterRequest,
    password_hash: &str,
    role_id: i32,
) -> Result<UserProfile> {
    let query = format!(
        r#"INSERT INTO "users" ("email", "password", "fname", "lname", "phone", "dob", "role_id")
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}"#,
        PROFILE_COLUMNS
    );

    with_timeout(WRITE_TIMEOUT, "insert user", async {
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(&req.email)
            .bind(password_hash)
            .bind(&req.fname)
            .bind(&req.lname)
            .bind(&req.phone)
            .bind(&req.dob)
            .bind(role_id)
            .fetch_one(pool)
            .await
            .map_err(map_unique_violation)
    })
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<CredentialCheck>> {
    let user = sqlx::query_as::<_, CredentialCheck>(
        r#"SELECT "id", "email", "password", "fname", "lname", "phone", "avatar", "dob", "role_id"
        FROM "users"
        WHERE "email" = $1"#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_profile(pool: &PgPool, user_id: i32) -> Result<Option<UserProfile>> {
    let query = format!(
        r#"SELECT {} FROM "users" WHERE "id" = $1"#,
        PROFILE_COLUMNS
    );

    let profile = sqlx::query_as::<_, UserProfile>(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(profile)
}

/// Partial profile update; skips the UPDATE entirely when no field was
/// supplied and just returns the current row.
pub async fn update_profile(pool: &PgPool, req: &ProfileUpdate) -> Result<UserProfile> {
    if let Some(mut query) = builders::update_profile_query(req) {
        with_timeout(WRITE_TIMEOUT, "update profile", async {
            query
                .build()
                .execute(pool)
                .await
                .map_err(map_unique_violation)?;
            Ok(())
        })
        .await?;
    }

    get_profile(pool, req.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("მომხმარებელი ვერ მოიძებნა".to_string()))
}

pub async fn insert_oauth(pool: &PgPool, user_id: i32, access_token: &str) -> Result<i32> {
    with_timeout(WRITE_TIMEOUT, "insert oauth", async {
        let id: i32 = sqlx::query_scalar(
            r#"INSERT INTO "oauth" ("user_id", "access_token")
            VALUES ($1, $2)
            RETURNING "id""#,
        )
        .bind(user_id)
        .bind(access_token)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(format!("insert oauth failed: {}", e)))?;

        Ok(id)
    })
    .await
}

pub async fn delete_oauth(pool: &PgPool, oauth_id: i32) -> Result<()> {
    let result = with_timeout(WRITE_TIMEOUT, "delete oauth", async {
        Ok(sqlx::query(r#"DELETE FROM "oauth" WHERE "id" = $1"#)
            .bind(oauth_id)
            .execute(pool)
            .await?)
    })
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest("სესია ვერ მოიძებნა".to_string()));
    }

    Ok(())
}

/// Signout deletes the oauth row, so a verified JWT is only good while its
/// row still exists.
pub async fn find_access_token(pool: &PgPool, user_id: i32, access_token: &str) -> Result<bool> {
    let check: bool = sqlx::query_scalar(
        r#"SELECT
            (CASE WHEN COUNT(*) = 1 THEN TRUE ELSE FALSE END)
        FROM "oauth"
        WHERE "user_id" = $1
        AND "access_token" = $2"#,
    )
    .bind(user_id)
    .bind(access_token)
    .fetch_one(pool)
    .await?;

    Ok(check)
}
