use uuid::Uuid;

use crate::error::{AppError, Result};

const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Validates the file extension against the image allow-list and returns it
/// normalized to lowercase.
pub fn validate_extension(filename: &str) -> Result<String> {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest("invalid file extension".to_string()));
    }

    Ok(ext)
}

pub fn rand_file_name(ext: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), ext)
}

pub fn check_file_size(size: usize, limit: usize) -> Result<()> {
    if size > limit {
        return Err(AppError::BadRequest(format!(
            "file size must less than {} MB",
            limit.div_ceil(1024 * 1024)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_image_extensions() {
        assert_eq!(validate_extension("photo.png").unwrap(), "png");
        assert_eq!(validate_extension("photo.JPG").unwrap(), "jpg");
        assert_eq!(validate_extension("a.b.jpeg").unwrap(), "jpeg");
    }

    #[test]
    fn rejects_everything_else() {
        assert!(validate_extension("script.exe").is_err());
        assert!(validate_extension("archive.tar.gz").is_err());
        assert!(validate_extension("no_extension").is_err());
    }

    #[test]
    fn random_names_keep_the_extension() {
        let name = rand_file_name("png");
        assert!(name.ends_with(".png"));
        assert_ne!(rand_file_name("png"), rand_file_name("png"));
    }

    #[test]
    fn oversized_file_is_rejected() {
        assert!(check_file_size(3 * 1024 * 1024, 2 * 1024 * 1024).is_err());
        assert!(check_file_size(1024, 2 * 1024 * 1024).is_ok());
    }
}
