//! YAML configuration.
//!
//! Every section and field has a default, so an empty document is a valid
//! configuration:
//!
//! ```yaml
//! cache:
//!   methods: [GET, HEAD]
//!   prefixes: ["http://localhost:8080/users"]
//!   exclude: []
//!   refresh_header: x-refresh
//! search:
//!   url: http://localhost:8080/users
//!   param: name
//!   debounce: 500ms
//! upload:
//!   url: http://localhost:8080/upload/file
//!   chunks: 5
//!   delay: 300ms
//!   total: 12345678
//! retry:
//!   attempts: 1
//! ```

use std::time::Duration;

use http::header::InvalidHeaderName;
use http::method::InvalidMethod;
use http::{HeaderName, Method};
use relay_cache::predicate::{self, CacheRule, UrlPrefix};
use relay_cache::{CachingInterceptor, RequestCache};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upload::UploadSimulator;

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid YAML or does not match the schema.
    #[error("invalid configuration document: {0}")]
    Yaml(#[from] serde_saphyr::Error),
    /// A cache method is not a valid HTTP method.
    #[error("invalid HTTP method '{0}': {1}")]
    InvalidMethod(String, #[source] InvalidMethod),
    /// The refresh header is not a valid header name.
    #[error("invalid header name '{0}': {1}")]
    InvalidHeaderName(String, #[source] InvalidHeaderName),
    /// The upload simulator needs at least one chunk.
    #[error("upload chunk count must be at least 1")]
    ZeroChunks,
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Caching interceptor settings.
    pub cache: CacheSettings,
    /// Search service and dispatcher settings.
    pub search: SearchSettings,
    /// Upload interceptor and simulator settings.
    pub upload: UploadSettings,
    /// Whole-chain retry settings.
    pub retry: RetrySettings,
}

impl RelayConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RelayConfig = serde_saphyr::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.parsed_methods()?;
        self.cache.parsed_refresh_header()?;
        if self.upload.chunks == 0 {
            return Err(ConfigError::ZeroChunks);
        }
        Ok(())
    }
}

/// Which requests the caching interceptor serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Cacheable methods.
    pub methods: Vec<String>,
    /// Cacheable URL prefixes. Empty means nothing is cached.
    pub prefixes: Vec<String>,
    /// URL prefixes kept out of the cache even when listed in `prefixes`.
    pub exclude: Vec<String>,
    /// Header that marks a request as a refresh request.
    pub refresh_header: Option<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            methods: vec!["GET".to_owned(), "HEAD".to_owned()],
            prefixes: Vec::new(),
            exclude: Vec::new(),
            refresh_header: None,
        }
    }
}

impl CacheSettings {
    fn parsed_methods(&self) -> Result<Vec<Method>, ConfigError> {
        self.methods
            .iter()
            .map(|method| {
                Method::from_bytes(method.as_bytes())
                    .map_err(|error| ConfigError::InvalidMethod(method.clone(), error))
            })
            .collect()
    }

    fn parsed_refresh_header(&self) -> Result<Option<HeaderName>, ConfigError> {
        self.refresh_header
            .as_deref()
            .map(|name| {
                name.parse()
                    .map_err(|error| ConfigError::InvalidHeaderName(name.to_owned(), error))
            })
            .transpose()
    }

    /// Cacheability rule: a listed method on a listed, non-excluded prefix.
    pub fn predicate(&self) -> Result<CacheRule, ConfigError> {
        Ok(CacheRule::new(
            predicate::Method::any(self.parsed_methods()?),
            UrlPrefix::any(self.prefixes.iter().cloned()),
        )
        .exclude(UrlPrefix::any(self.exclude.iter().cloned())))
    }

    /// Caching interceptor over `cache`.
    pub fn interceptor(&self, cache: RequestCache) -> Result<CachingInterceptor, ConfigError> {
        let interceptor = CachingInterceptor::new(cache, self.predicate()?);
        Ok(match self.parsed_refresh_header()? {
            Some(header) => interceptor.refresh_header(header),
            None => interceptor,
        })
    }
}

/// Search endpoint and dispatcher timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Search endpoint.
    pub url: String,
    /// Query parameter carrying the search text.
    pub param: String,
    /// Quiet period before a query settles (e.g. "500ms").
    #[serde(with = "humantime_serde")]
    pub debounce: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/users".to_owned(),
            param: "name".to_owned(),
            debounce: Duration::from_millis(500),
        }
    }
}

/// Upload short-circuit and simulator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Requests whose URL starts with this are served by the simulator.
    pub url: String,
    /// Number of progress steps.
    pub chunks: u32,
    /// Delay between steps (e.g. "300ms").
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
    /// Size reported for requests without a body.
    pub total: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/upload/file".to_owned(),
            chunks: 5,
            delay: Duration::from_millis(300),
            total: 12_345_678,
        }
    }
}

impl UploadSettings {
    /// Simulator with the configured chunk count and delay.
    pub fn simulator(&self) -> Result<UploadSimulator, ConfigError> {
        if self.chunks == 0 {
            return Err(ConfigError::ZeroChunks);
        }
        Ok(UploadSimulator::new(self.chunks, self.delay))
    }
}

/// Whole-chain retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total executions per request; 1 disables retries.
    pub attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { attempts: 1 }
    }
}
