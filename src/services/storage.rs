use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{Client as S3Client, primitives::ByteStream, types::ObjectCannedAcl};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, Result},
    models::{DeleteFileRequest, FileRes, FileUpload},
};

const NUM_WORKERS: usize = 5;
const STORAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Seam over the object store so the worker pools can run against a mock.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(&self, destination: &str, data: Vec<u8>) -> Result<()>;
    async fn delete_object(&self, destination: &str) -> Result<()>;
}

pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(&self, destination: &str, data: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(destination)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| AppError::InternalError(format!("upload to s3 failed: {}", e)))?;

        Ok(())
    }

    async fn delete_object(&self, destination: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(destination)
            .send()
            .await
            .map_err(|e| AppError::InternalError(format!("delete from s3 failed: {}", e)))?;

        Ok(())
    }
}

async fn upload_worker(
    storage: Arc<dyn ObjectStorage>,
    assets_url: String,
    jobs: Arc<Mutex<mpsc::Receiver<FileUpload>>>,
    results: mpsc::Sender<Result<(String, FileRes)>>,
    cancel: CancellationToken,
) {
    loop {
        // Stop claiming work as soon as any worker has failed.
        let job = {
            let mut rx = jobs.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => None,
                job = rx.recv() => job,
            }
        };

        let Some(job) = job else { return };

        match storage.put_object(&job.destination, job.data).await {
            Ok(()) => {
                let file = FileRes {
                    filename: job.filename,
                    url: format!("{}/{}", assets_url, job.destination),
                };
                if results.send(Ok((job.destination, file))).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                cancel.cancel();
                let _ = results.send(Err(e)).await;
                return;
            }
        }
    }
}

/// Fans the batch out over a fixed pool of workers. Any single failure fails
/// the whole batch: the first error cancels the remaining jobs and blobs that
/// were already stored are removed again, so an aborted batch leaks nothing.
pub async fn upload_batch(
    storage: Arc<dyn ObjectStorage>,
    assets_url: &str,
    files: Vec<FileUpload>,
) -> Result<Vec<FileRes>> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let total = files.len();
    let (job_tx, job_rx) = mpsc::channel::<FileUpload>(total);
    let (result_tx, mut result_rx) = mpsc::channel::<Result<(String, FileRes)>>(total);

    for file in files {
        if job_tx.send(file).await.is_err() {
            return Err(AppError::InternalError("upload queue closed".to_string()));
        }
    }
    drop(job_tx);

    let jobs = Arc::new(Mutex::new(job_rx));
    let cancel = CancellationToken::new();

    let workers: Vec<JoinHandle<()>> = (0..NUM_WORKERS)
        .map(|_| {
            tokio::spawn(upload_worker(
                storage.clone(),
                assets_url.to_string(),
                jobs.clone(),
                result_tx.clone(),
                cancel.clone(),
            ))
        })
        .collect();
    drop(result_tx);

    let collect = async {
        let mut uploaded: Vec<(String, FileRes)> = Vec::with_capacity(total);
        let mut failure: Option<AppError> = None;

        while let Some(result) = result_rx.recv().await {
            match result {
                Ok(pair) => uploaded.push(pair),
                Err(e) => {
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }

        (uploaded, failure)
    };

    let (uploaded, failure) = match tokio::time::timeout(STORAGE_TIMEOUT, collect).await {
        Ok(outcome) => outcome,
        Err(_) => {
            cancel.cancel();
            for worker in workers {
                worker.abort();
            }
            return Err(AppError::InternalError("upload file timed out".to_string()));
        }
    };

    if let Some(error) = failure {
        for (destination, _) in &uploaded {
            if let Err(e) = storage.delete_object(destination).await {
                tracing::warn!(
                    "failed to clean up {} after aborted upload: {}",
                    destination,
                    e
                );
            }
        }
        return Err(error);
    }

    Ok(uploaded.into_iter().map(|(_, file)| file).collect())
}

async fn delete_worker(
    storage: Arc<dyn ObjectStorage>,
    jobs: Arc<Mutex<mpsc::Receiver<DeleteFileRequest>>>,
    results: mpsc::Sender<Result<()>>,
    cancel: CancellationToken,
) {
    loop {
        let job = {
            let mut rx = jobs.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => None,
                job = rx.recv() => job,
            }
        };

        let Some(job) = job else { return };

        match storage.delete_object(&job.destination).await {
            Ok(()) => {
                if results.send(Ok(())).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                cancel.cancel();
                let _ = results.send(Err(e)).await;
                return;
            }
        }
    }
}

/// Same pool shape as the upload path; first error wins and aborts the rest.
pub async fn delete_batch(
    storage: Arc<dyn ObjectStorage>,
    requests: Vec<DeleteFileRequest>,
) -> Result<()> {
    if requests.is_empty() {
        return Ok(());
    }

    let total = requests.len();
    let (job_tx, job_rx) = mpsc::channel::<DeleteFileRequest>(total);
    let (result_tx, mut result_rx) = mpsc::channel::<Result<()>>(total);

    for request in requests {
        if job_tx.send(request).await.is_err() {
            return Err(AppError::InternalError("delete queue closed".to_string()));
        }
    }
    drop(job_tx);

    let jobs = Arc::new(Mutex::new(job_rx));
    let cancel = CancellationToken::new();

    let workers: Vec<JoinHandle<()>> = (0..NUM_WORKERS)
        .map(|_| {
            tokio::spawn(delete_worker(
                storage.clone(),
                jobs.clone(),
                result_tx.clone(),
                cancel.clone(),
            ))
        })
        .collect();
    drop(result_tx);

    let collect = async {
        let mut failure: Option<AppError> = None;
        while let Some(result) = result_rx.recv().await {
            if let Err(e) = result {
                if failure.is_none() {
                    failure = Some(e);
                }
            }
        }
        failure
    };

    let failure = match tokio::time::timeout(STORAGE_TIMEOUT, collect).await {
        Ok(outcome) => outcome,
        Err(_) => {
            cancel.cancel();
            for worker in workers {
                worker.abort();
            }
            return Err(AppError::InternalError("delete file timed out".to_string()));
        }
    };

    match failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct MockStorage {
        stored: StdMutex<Vec<String>>,
        deleted: StdMutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl MockStorage {
        fn failing_on(destination: &str) -> Self {
            Self {
                fail_on: Some(destination.to_string()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ObjectStorage for MockStorage {
        async fn put_object(&self, destination: &str, _data: Vec<u8>) -> Result<()> {
            if self.fail_on.as_deref() == Some(destination) {
                return Err(AppError::InternalError("induced failure".to_string()));
            }
            self.stored.lock().unwrap().push(destination.to_string());
            Ok(())
        }

        async fn delete_object(&self, destination: &str) -> Result<()> {
            if self.fail_on.as_deref() == Some(destination) {
                return Err(AppError::InternalError("induced failure".to_string()));
            }
            self.deleted.lock().unwrap().push(destination.to_string());
            Ok(())
        }
    }

    fn uploads(names: &[&str]) -> Vec<FileUpload> {
        names
            .iter()
            .map(|name| FileUpload {
                destination: format!("products/{}", name),
                filename: name.to_string(),
                data: vec![0u8; 16],
            })
            .collect()
    }

    #[tokio::test]
    async fn upload_batch_returns_every_result() {
        let mock = Arc::new(MockStorage::default());
        let storage: Arc<dyn ObjectStorage> = mock.clone();

        let files = upload_batch(
            storage,
            "https://cdn.example.com",
            uploads(&["a.png", "b.png", "c.png", "d.png"]),
        )
        .await
        .unwrap();

        assert_eq!(files.len(), 4);
        assert!(files
            .iter()
            .all(|f| f.url.starts_with("https://cdn.example.com/products/")));
        assert_eq!(mock.stored.lock().unwrap().len(), 4);
        assert!(mock.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_upload_batch_is_a_noop() {
        let mock = Arc::new(MockStorage::default());
        let storage: Arc<dyn ObjectStorage> = mock.clone();

        let files = upload_batch(storage, "https://cdn.example.com", Vec::new())
            .await
            .unwrap();

        assert!(files.is_empty());
        assert!(mock.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn single_failure_fails_the_batch_and_compensates() {
        let mock = Arc::new(MockStorage::failing_on("products/broken.png"));
        let storage: Arc<dyn ObjectStorage> = mock.clone();

        let result = upload_batch(
            storage,
            "https://cdn.example.com",
            uploads(&["a.png", "b.png", "broken.png", "c.png", "d.png", "e.png"]),
        )
        .await;

        assert!(result.is_err());

        // every blob that made it up before the abort was deleted again
        let mut stored = mock.stored.lock().unwrap().clone();
        let mut deleted = mock.deleted.lock().unwrap().clone();
        stored.sort();
        deleted.sort();
        assert_eq!(stored, deleted);
    }

    #[tokio::test]
    async fn delete_batch_deletes_everything() {
        let mock = Arc::new(MockStorage::default());
        let storage: Arc<dyn ObjectStorage> = mock.clone();

        let requests = vec![
            DeleteFileRequest {
                destination: "products/a.png".to_string(),
            },
            DeleteFileRequest {
                destination: "products/b.png".to_string(),
            },
        ];

        delete_batch(storage, requests).await.unwrap();

        assert_eq!(mock.deleted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_batch_surfaces_first_error() {
        let mock = Arc::new(MockStorage::failing_on("products/broken.png"));
        let storage: Arc<dyn ObjectStorage> = mock.clone();

        let requests = vec![
            DeleteFileRequest {
                destination: "products/a.png".to_string(),
            },
            DeleteFileRequest {
                destination: "products/broken.png".to_string(),
            },
        ];

        assert!(delete_batch(storage, requests).await.is_err());
    }
}
