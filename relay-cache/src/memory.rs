//! In-process backend.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use relay_core::Response;

use crate::{Backend, BackendResult, CacheKey, DeleteStatus};

/// In-memory backend on a [`DashMap`].
///
/// Cloning is cheap and shares the same store. Entries never expire and are
/// never evicted.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    store: Arc<DashMap<CacheKey, Response>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns `true` if an entry exists for `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.store.contains_key(key)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.store.clear();
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Response>> {
        Ok(self.store.get(key).map(|entry| entry.value().clone()))
    }

    async fn write(&self, key: &CacheKey, response: Response) -> BackendResult<()> {
        self.store.insert(key.clone(), response);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        Ok(match self.store.remove(key) {
            Some(_) => DeleteStatus::Deleted,
            None => DeleteStatus::Missing,
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;

    fn key(url: &str) -> CacheKey {
        CacheKey::new(Method::GET, url, Vec::new())
    }

    #[tokio::test]
    async fn last_write_wins() {
        let backend = MemoryBackend::new();
        let key = key("http://localhost/users");

        backend
            .write(&key, Response::new(StatusCode::OK).with_body("first"))
            .await
            .unwrap();
        backend
            .write(&key, Response::new(StatusCode::OK).with_body("second"))
            .await
            .unwrap();

        let stored = backend.read(&key).await.unwrap().unwrap();
        assert_eq!(stored.body().as_ref(), b"second");
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn remove_reports_missing_entries() {
        let backend = MemoryBackend::new();
        let key = key("http://localhost/users");
        backend
            .write(&key, Response::new(StatusCode::OK))
            .await
            .unwrap();

        assert_eq!(backend.remove(&key).await.unwrap(), DeleteStatus::Deleted);
        assert_eq!(backend.remove(&key).await.unwrap(), DeleteStatus::Missing);
        assert!(backend.read(&key).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_do_not_corrupt_the_store() {
        let backend = MemoryBackend::new();
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let backend = backend.clone();
                tokio::spawn(async move {
                    let key = key(&format!("http://localhost/{}", i % 4));
                    backend
                        .write(&key, Response::new(StatusCode::OK))
                        .await
                        .unwrap();
                    backend.read(&key).await.unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }
        assert_eq!(backend.len(), 4);
    }
}
