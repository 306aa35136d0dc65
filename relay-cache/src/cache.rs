//! Request-keyed cache facade.

use std::fmt;
use std::sync::Arc;

use relay_core::{Request, Response};
use tracing::{debug, warn};

use crate::{Backend, CacheKey, DeleteStatus, MemoryBackend};

/// Shared cache of responses, keyed by [`CacheKey::from_request`].
///
/// Clones share the same backend, so one cache can serve many chains.
/// Backend failures are logged and degraded: a failed read is a miss and a
/// failed write is skipped.
#[derive(Clone)]
pub struct RequestCache {
    backend: Arc<dyn Backend>,
}

impl RequestCache {
    /// Creates a cache on top of `backend`.
    pub fn new<B>(backend: B) -> Self
    where
        B: Backend + 'static,
    {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Creates a cache on top of an already shared backend.
    pub fn from_shared(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Looks up the cached response for `request`.
    pub async fn get(&self, request: &Request) -> Option<Response> {
        self.read(&CacheKey::from_request(request)).await
    }

    /// Stores `response` for `request`, replacing any previous entry.
    pub async fn put(&self, request: &Request, response: Response) {
        self.write(&CacheKey::from_request(request), response).await
    }

    /// Drops the entry for `request`. Returns `true` if one existed.
    pub async fn invalidate(&self, request: &Request) -> bool {
        let key = CacheKey::from_request(request);
        match self.backend.remove(&key).await {
            Ok(DeleteStatus::Deleted) => true,
            Ok(DeleteStatus::Missing) => false,
            Err(error) => {
                warn!(backend = self.backend.name(), %key, %error, "cache remove failed");
                false
            }
        }
    }

    pub(crate) async fn read(&self, key: &CacheKey) -> Option<Response> {
        match self.backend.read(key).await {
            Ok(Some(response)) => {
                debug!(backend = self.backend.name(), %key, "cache hit");
                Some(response)
            }
            Ok(None) => {
                debug!(backend = self.backend.name(), %key, "cache miss");
                None
            }
            Err(error) => {
                warn!(backend = self.backend.name(), %key, %error, "cache read failed, treating as miss");
                None
            }
        }
    }

    pub(crate) async fn write(&self, key: &CacheKey, response: Response) {
        match self.backend.write(key, response).await {
            Ok(()) => debug!(backend = self.backend.name(), %key, "cache updated"),
            Err(error) => {
                warn!(backend = self.backend.name(), %key, %error, "cache write failed")
            }
        }
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl fmt::Debug for RequestCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCache")
            .field("backend", &self.backend.name())
            .finish()
    }
}
