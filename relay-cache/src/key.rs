//! Cache keys derived from requests.
//!
//! A [`CacheKey`] is the normalized identity of a request:
//!
//! 1. **Method** - the HTTP method
//! 2. **URL** - the URL without its query string
//! 3. **Query** - every query parameter, from both the URL and the request's
//!    parameter list, sorted by name then value
//!
//! Headers never take part in the key, so two requests differing only in
//! headers share a cache entry.
//!
//! ## Format
//!
//! Keys display as `{METHOD} {url}?{k1}={v1}&{k2}={v2}`; the query part is
//! omitted when there are no parameters.
//!
//! ```
//! use relay_cache::CacheKey;
//! use relay_core::Request;
//!
//! let request = Request::get("http://localhost/users?page=2")
//!     .param("name", "dom")
//!     .build();
//! let key = CacheKey::from_request(&request);
//! assert_eq!(key.to_string(), "GET http://localhost/users?name=dom&page=2");
//! ```
//!
//! [`CacheKey`] wraps its data in an `Arc`, so cloning a key only bumps a
//! reference count. [`KeyPart`] stores short strings inline via [`SmolStr`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use http::Method;
use relay_core::Request;
use smol_str::SmolStr;

#[derive(Debug, Eq, PartialEq, Hash)]
struct CacheKeyInner {
    method: Method,
    url: SmolStr,
    query: Vec<KeyPart>,
}

/// Normalized identity of a cacheable request.
#[derive(Clone, Debug)]
pub struct CacheKey {
    inner: Arc<CacheKeyInner>,
}

impl CacheKey {
    /// Creates a key from its components, sorting the query parts.
    pub fn new(method: Method, url: impl Into<SmolStr>, mut query: Vec<KeyPart>) -> Self {
        query.sort();
        CacheKey {
            inner: Arc::new(CacheKeyInner {
                method,
                url: url.into(),
                query,
            }),
        }
    }

    /// Derives the key of `request`.
    ///
    /// A query string embedded in the URL is merged with the request's
    /// parameter list. Parts of the embedded query that do not decode are
    /// kept as part of the URL.
    pub fn from_request(request: &Request) -> Self {
        let mut query: Vec<KeyPart> = request
            .params()
            .iter()
            .map(|(key, value)| KeyPart::new(key, value))
            .collect();

        let url = match request.url().split_once('?') {
            Some((base, embedded)) => {
                match serde_urlencoded::from_str::<Vec<(String, String)>>(embedded) {
                    Ok(pairs) => {
                        query.extend(pairs.iter().map(|(key, value)| KeyPart::new(key, value)));
                        base
                    }
                    Err(_) => request.url(),
                }
            }
            None => request.url(),
        };

        Self::new(request.method().clone(), url.trim_end_matches('?'), query)
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// URL without query string.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Sorted query parts.
    pub fn query(&self) -> impl Iterator<Item = &KeyPart> {
        self.inner.query.iter()
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.inner.method, self.inner.url)?;
        for (i, part) in self.inner.query.iter().enumerate() {
            let separator = if i == 0 { '?' } else { '&' };
            write!(f, "{separator}{part}")?;
        }
        Ok(())
    }
}

/// A single query parameter of a [`CacheKey`].
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct KeyPart {
    key: SmolStr,
    value: SmolStr,
}

impl KeyPart {
    /// Creates a key part.
    pub fn new(key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        KeyPart {
            key: SmolStr::new(key),
            value: SmolStr::new(value),
        }
    }

    /// Parameter name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parameter value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
