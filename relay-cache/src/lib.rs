//! Response caching for relay chains.
//!
//! - [`CacheKey`] normalizes a request into its cache identity.
//! - [`Backend`] is the storage seam; [`MemoryBackend`] keeps entries in a
//!   concurrent map.
//! - [`RequestCache`] is the request-keyed facade shared between chains.
//! - [`predicate`] decides which requests are cacheable.
//! - [`CachingInterceptor`] plugs the cache into a chain with
//!   stale-while-revalidate support.
//!
//! ```
//! use relay_cache::predicate::{CacheRule, Method, UrlPrefix};
//! use relay_cache::{CachingInterceptor, RequestCache};
//!
//! let cache = RequestCache::default();
//! let interceptor = CachingInterceptor::new(
//!     cache.clone(),
//!     CacheRule::new(Method::new(http::Method::GET), UrlPrefix::new("http://localhost/users")),
//! )
//! .refresh_header(http::HeaderName::from_static("x-refresh"));
//! ```

#![warn(missing_docs)]

mod backend;
mod cache;
mod interceptor;
mod key;
mod memory;
pub mod predicate;

pub use backend::{Backend, BackendError, BackendResult, DeleteStatus};
pub use cache::RequestCache;
pub use interceptor::CachingInterceptor;
pub use key::{CacheKey, KeyPart};
pub use memory::MemoryBackend;
