//! Caching interceptor.
//!
//! For cacheable requests:
//!
//! | refresh | cache | events delivered                        |
//! |---------|-------|-----------------------------------------|
//! | no      | hit   | cached response, terminal not contacted |
//! | no      | miss  | live events, response cached            |
//! | yes     | hit   | cached response, then live events       |
//! | yes     | miss  | live events, response cached            |
//!
//! Only 2xx responses are written, and always before they reach the caller.
//! Requests the predicate refuses pass through untouched.

use std::sync::Arc;

use futures::{StreamExt, stream};
use http::HeaderName;
use relay_core::{Event, EventStream, Interceptor, Next, Request};
use tracing::debug;

use crate::predicate::{Predicate, PredicateResult, RequestPredicate};
use crate::{CacheKey, RequestCache};

/// Serves cacheable requests from a [`RequestCache`].
#[derive(Clone)]
pub struct CachingInterceptor {
    cache: RequestCache,
    predicate: RequestPredicate,
    refresh_header: Option<HeaderName>,
}

impl CachingInterceptor {
    /// Caches requests accepted by `predicate` in `cache`.
    pub fn new<P>(cache: RequestCache, predicate: P) -> Self
    where
        P: Predicate<Subject = Request> + Send + Sync + 'static,
    {
        Self {
            cache,
            predicate: Arc::new(predicate),
            refresh_header: None,
        }
    }

    /// Also treats requests carrying `header` as refresh requests.
    ///
    /// The header is removed before the request is forwarded.
    pub fn refresh_header(self, header: HeaderName) -> Self {
        Self {
            refresh_header: Some(header),
            ..self
        }
    }

    /// The cache this interceptor reads and writes.
    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }
}

impl std::fmt::Debug for CachingInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingInterceptor")
            .field("cache", &self.cache)
            .field("refresh_header", &self.refresh_header)
            .finish()
    }
}

/// Forwards `request` and writes successful responses to the cache before
/// passing them on.
fn fetch_live(cache: RequestCache, key: CacheKey, request: Request, next: Next) -> EventStream {
    next.handle(request)
        .then(move |event| {
            let cache = cache.clone();
            let key = key.clone();
            async move {
                if let Ok(Event::Response(response)) = &event
                    && response.is_success()
                {
                    cache.write(&key, response.clone()).await;
                }
                event
            }
        })
        .boxed()
}

impl Interceptor for CachingInterceptor {
    fn name(&self) -> &str {
        "caching"
    }

    fn intercept(&self, request: Request, next: Next) -> EventStream {
        let cache = self.cache.clone();
        let predicate = Arc::clone(&self.predicate);
        let refresh_header = self.refresh_header.clone();

        stream::once(async move {
            let request = match predicate.check(request).await {
                PredicateResult::Cacheable(request) => request,
                PredicateResult::NonCacheable(request) => {
                    debug!(url = request.url(), method = %request.method(), "not cacheable, passing through");
                    return next.handle(request);
                }
            };

            let (request, refresh) = match &refresh_header {
                Some(header) if request.headers().contains_key(header) => {
                    let mut headers = request.headers().clone();
                    headers.remove(header);
                    (request.with_headers(headers), true)
                }
                _ => {
                    let refresh = request.refresh();
                    (request, refresh)
                }
            };

            let key = CacheKey::from_request(&request);
            match cache.read(&key).await {
                Some(cached) if !refresh => {
                    debug!(%key, "serving from cache");
                    stream::iter([Ok(Event::Response(cached))]).boxed()
                }
                Some(cached) => {
                    debug!(%key, "serving from cache, then refreshing");
                    stream::iter([Ok(Event::Response(cached))])
                        .chain(fetch_live(cache, key, request, next))
                        .boxed()
                }
                None => fetch_live(cache, key, request, next),
            }
        })
        .flatten()
        .boxed()
    }
}
