use serde::{Deserialize, Serialize};

/// One file queued for the upload worker pool.
#[derive(Debug)]
pub struct FileUpload {
    pub destination: String,
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRes {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteFileRequest {
    pub destination: String,
}
