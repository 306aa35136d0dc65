//! Predicates over [`Request`]s.

use async_trait::async_trait;
use relay_core::Request;
use tracing::debug;

use super::{Predicate, PredicateResult};

/// Accepts requests whose method is in a fixed set.
///
/// Only side-effect free methods belong here; the cache never checks that
/// on its own.
#[derive(Debug, Clone)]
pub struct Method {
    methods: Vec<http::Method>,
}

impl Method {
    /// Accepts a single method.
    pub fn new(method: http::Method) -> Self {
        Self {
            methods: vec![method],
        }
    }

    /// Accepts any of `methods`. An empty set accepts nothing.
    pub fn any(methods: impl IntoIterator<Item = http::Method>) -> Self {
        Self {
            methods: methods.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Predicate for Method {
    type Subject = Request;

    async fn check(&self, request: Request) -> PredicateResult<Request> {
        if self.methods.contains(request.method()) {
            PredicateResult::Cacheable(request)
        } else {
            PredicateResult::NonCacheable(request)
        }
    }
}

/// Accepts requests whose URL starts with one of the configured prefixes.
///
/// The default set is empty and accepts nothing.
#[derive(Debug, Clone, Default)]
pub struct UrlPrefix {
    prefixes: Vec<String>,
}

impl UrlPrefix {
    /// Accepts URLs starting with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefixes: vec![prefix.into()],
        }
    }

    /// Accepts URLs starting with any of `prefixes`. An empty set accepts
    /// nothing.
    pub fn any<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Predicate for UrlPrefix {
    type Subject = Request;

    async fn check(&self, request: Request) -> PredicateResult<Request> {
        if self
            .prefixes
            .iter()
            .any(|prefix| request.url().starts_with(prefix.as_str()))
        {
            PredicateResult::Cacheable(request)
        } else {
            PredicateResult::NonCacheable(request)
        }
    }
}

/// A listed method on an included prefix, outside every excluded prefix.
#[derive(Debug, Clone)]
pub struct CacheRule {
    methods: Method,
    include: UrlPrefix,
    exclude: UrlPrefix,
}

impl CacheRule {
    /// Caches `methods` under `include`.
    pub fn new(methods: Method, include: UrlPrefix) -> Self {
        Self {
            methods,
            include,
            exclude: UrlPrefix::default(),
        }
    }

    /// Keeps URLs under `exclude` out of the cache even when included.
    pub fn exclude(self, exclude: UrlPrefix) -> Self {
        Self { exclude, ..self }
    }
}

#[async_trait]
impl Predicate for CacheRule {
    type Subject = Request;

    async fn check(&self, request: Request) -> PredicateResult<Request> {
        let request = match self.methods.check(request).await {
            PredicateResult::Cacheable(request) => request,
            refused => return refused,
        };
        let request = match self.include.check(request).await {
            PredicateResult::Cacheable(request) => request,
            refused => return refused,
        };
        match self.exclude.check(request).await {
            PredicateResult::Cacheable(request) => {
                debug!(url = request.url(), "excluded from caching");
                PredicateResult::NonCacheable(request)
            }
            PredicateResult::NonCacheable(request) => PredicateResult::Cacheable(request),
        }
    }
}
