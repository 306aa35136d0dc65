//! Storage behind the request cache.

use std::sync::Arc;

use async_trait::async_trait;
use relay_core::Response;
use thiserror::Error;

use crate::CacheKey;

/// Error type for backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Any failure inside the storage.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Outcome of [`Backend::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// The entry existed and was removed.
    Deleted,
    /// There was no entry for the key.
    Missing,
}

/// Key/value storage for cached responses.
///
/// Implementations must tolerate concurrent reads and writes from
/// independent chain executions. Writes overwrite unconditionally; the last
/// writer wins.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Reads the entry for `key`.
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Response>>;

    /// Writes `response` under `key`, replacing any previous entry.
    async fn write(&self, key: &CacheKey, response: Response) -> BackendResult<()>;

    /// Removes the entry for `key`.
    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "backend"
    }
}

#[async_trait]
impl<B> Backend for Arc<B>
where
    B: Backend + ?Sized,
{
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Response>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, response: Response) -> BackendResult<()> {
        (**self).write(key, response).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Response>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, response: Response) -> BackendResult<()> {
        (**self).write(key, response).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
