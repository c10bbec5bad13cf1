use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    middleware::{ADMIN_ROLE, CUSTOMER_ROLE},
    models::{
        FileUpload, Passport, ProfileUpdate, RegisterRequest, SigninRequest, SignoutRequest,
        TokenResponse, UserProfile,
    },
    queries::user_queries,
    services,
    utils::{
        extractors::ensure_owner,
        jwt::{self, Claims},
        uploads::{check_file_size, rand_file_name, validate_extension},
    },
};

fn validate_registration(payload: &RegisterRequest) -> Result<()> {
    if payload.email.is_empty() || !payload.email.contains('@') {
        return Err(AppError::BadRequest("არასწორი ელფოსტა".to_string()));
    }

    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "პაროლი უნდა იყოს მინიმუმ 8 სიმბოლო".to_string(),
        ));
    }

    if payload.fname.trim().is_empty() || payload.lname.trim().is_empty() {
        return Err(AppError::BadRequest(
            "სახელი და გვარი აუცილებელია".to_string(),
        ));
    }

    if payload.phone.trim().is_empty() {
        return Err(AppError::BadRequest(
            "ტელეფონის ნომერი აუცილებელია".to_string(),
        ));
    }

    Ok(())
}

async fn insert_user(
    state: &AppState,
    payload: &RegisterRequest,
    role_id: i32,
) -> Result<UserProfile> {
    validate_registration(payload)?;

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;

    user_queries::insert_user(&state.db, payload, &password_hash, role_id).await
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let user = insert_user(&state, &payload, CUSTOMER_ROLE).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn signup_admin(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let user = insert_user(&state, &payload, ADMIN_ROLE).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<Passport>> {
    let user = user_queries::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("ელფოსტა ან პაროლი არასწორია".to_string()))?;

    let is_valid = bcrypt::verify(&payload.password, &user.password)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))?;

    if !is_valid {
        return Err(AppError::Unauthorized(
            "ელფოსტა ან პაროლი არასწორია".to_string(),
        ));
    }

    let access_token = jwt::generate_token(&state.config.jwt, user.id, user.role_id)?;
    let oauth_id = user_queries::insert_oauth(&state.db, user.id, &access_token).await?;

    Ok(Json(Passport {
        user: user.into(),
        token: TokenResponse {
            id: oauth_id,
            access_token,
        },
    }))
}

pub async fn signout(
    State(state): State<AppState>,
    Json(payload): Json<SignoutRequest>,
) -> Result<StatusCode> {
    user_queries::delete_oauth(&state.db, payload.oauth_id).await?;

    Ok(StatusCode::OK)
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfile>> {
    ensure_owner(&claims, user_id)?;

    let profile = user_queries::get_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("მომხმარებელი ვერ მოიძებნა".to_string()))?;

    Ok(Json(profile))
}

/// Multipart partial update: only supplied fields change; an optional single
/// avatar file goes through the upload pool first.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<UserProfile>> {
    ensure_owner(&claims, user_id)?;

    let mut update = ProfileUpdate {
        id: user_id,
        ..ProfileUpdate::default()
    };
    let mut avatar_file: Option<FileUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "email" => {
                update.email = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "fname" => {
                update.fname = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "lname" => {
                update.lname = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "phone" => {
                update.phone = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "avatar" => {
                if avatar_file.is_some() {
                    return Err(AppError::BadRequest("avatar must be one file".to_string()));
                }

                let original_name = field.file_name().unwrap_or_default().to_string();
                let ext = validate_extension(&original_name)?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                check_file_size(data.len(), state.config.storage.file_limit)?;

                let filename = rand_file_name(&ext);
                avatar_file = Some(FileUpload {
                    destination: format!("{}/{}", user_id, filename),
                    filename,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    if let Some(file) = avatar_file {
        let uploaded = services::upload_batch(
            state.storage.clone(),
            &state.config.storage.assets_url,
            vec![file],
        )
        .await?;

        update.avatar = uploaded.into_iter().next().map(|f| f.url);
    }

    let profile = user_queries::update_profile(&state.db, &update).await?;

    Ok(Json(profile))
}
