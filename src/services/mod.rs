pub mod storage;

pub use storage::{ObjectStorage, S3Storage, delete_batch, upload_batch};
