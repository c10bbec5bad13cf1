use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{DeleteFileRequest, FileRes, FileUpload},
    services,
    utils::uploads::{check_file_size, rand_file_name, validate_extension},
};

pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<FileRes>>)> {
    let mut destination = String::new();
    let mut staged: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "destination" => {
                destination = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "files" => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let ext = validate_extension(&original_name)?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                check_file_size(data.len(), state.config.storage.file_limit)?;

                staged.push((rand_file_name(&ext), data.to_vec()));
            }
            _ => {}
        }
    }

    if destination.is_empty() {
        return Err(AppError::BadRequest("destination is required".to_string()));
    }

    if staged.is_empty() {
        return Err(AppError::BadRequest("files is required".to_string()));
    }

    let jobs = staged
        .into_iter()
        .map(|(filename, data)| FileUpload {
            destination: format!("{}/{}", destination, filename),
            filename,
            data,
        })
        .collect();

    let files = services::upload_batch(
        state.storage.clone(),
        &state.config.storage.assets_url,
        jobs,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(files)))
}

pub async fn delete_files(
    State(state): State<AppState>,
    Json(requests): Json<Vec<DeleteFileRequest>>,
) -> Result<StatusCode> {
    services::delete_batch(state.storage.clone(), requests).await?;

    Ok(StatusCode::OK)
}
