pub mod builders;
pub mod cart_queries;
pub mod order_queries;
pub mod products_queries;
pub mod user_queries;

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, Result};

// Per-call deadlines, fixed rather than derived from the inbound request.
pub(crate) const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const READ_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) async fn with_timeout<T, F>(limit: Duration, op: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::InternalError(format!("{} timed out", op))),
    }
}
