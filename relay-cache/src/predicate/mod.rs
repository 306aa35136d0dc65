//! Cacheability predicates.
//!
//! A [`Predicate`] decides whether a request takes part in caching. The
//! request is passed by value and handed back inside the [`PredicateResult`]
//! whatever the verdict, so the interceptor can forward it without a clone.
//!
//! ```
//! use relay_cache::predicate::{CacheRule, Method, UrlPrefix};
//!
//! let cacheable = CacheRule::new(
//!     Method::any([http::Method::GET, http::Method::HEAD]),
//!     UrlPrefix::new("http://localhost/api/"),
//! )
//! .exclude(UrlPrefix::new("http://localhost/api/session"));
//! ```

mod request;

use std::sync::Arc;

use async_trait::async_trait;
use relay_core::Request;

pub use request::{CacheRule, Method, UrlPrefix};

/// Verdict of a predicate, carrying the request back to the caller.
#[derive(Debug)]
pub enum PredicateResult<S> {
    /// Served through the cache.
    Cacheable(S),
    /// Forwarded untouched.
    NonCacheable(S),
}

impl<S> PredicateResult<S> {
    /// Returns `true` for [`PredicateResult::Cacheable`].
    pub fn is_cacheable(&self) -> bool {
        matches!(self, PredicateResult::Cacheable(_))
    }
}

/// Decides whether a subject is cacheable.
#[async_trait]
pub trait Predicate {
    /// The type being evaluated.
    type Subject;

    /// Evaluates `subject`.
    async fn check(&self, subject: Self::Subject) -> PredicateResult<Self::Subject>;
}

/// Type-erased request predicate, as held by the caching interceptor.
pub type RequestPredicate = Arc<dyn Predicate<Subject = Request> + Send + Sync>;
