//! A configured pipeline with its services.

use std::sync::Arc;

use relay_cache::RequestCache;
use relay_core::{Chain, EventStream, Handler, Interceptor, Request, Retry};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::interceptors::{
    AuthInterceptor, EnsureHttpsInterceptor, LoggingInterceptor, TokenSource,
    TrimNameInterceptor, UploadInterceptor,
};
use crate::search::{ChainSearch, SearchDispatcher};
use crate::upload::Uploader;
use crate::{ConfigError, ErrorReporter, Notify, RelayConfig, TracingNotifier};

/// Builds a [`Relay`] from a [`RelayConfig`].
///
/// The chain runs, in order:
///
/// 1. [`EnsureHttpsInterceptor`], when enabled
/// 2. [`TrimNameInterceptor`]
/// 3. [`AuthInterceptor`], when a token source is set
/// 4. interceptors added with [`RelayBuilder::interceptor`], in order
/// 5. [`LoggingInterceptor`]
/// 6. the caching interceptor
/// 7. [`UploadInterceptor`]
///
/// and ends in the transport passed to [`RelayBuilder::build`].
pub struct RelayBuilder {
    config: RelayConfig,
    cache: RequestCache,
    notifier: Arc<dyn Notify>,
    tokens: Option<Arc<dyn TokenSource>>,
    ensure_https: bool,
    extra: Vec<Arc<dyn Interceptor>>,
}

impl RelayBuilder {
    /// Shares `cache` instead of a private in-memory one.
    pub fn cache(self, cache: RequestCache) -> Self {
        Self { cache, ..self }
    }

    /// Sends notifications to `notifier` instead of the log.
    pub fn notifier<N>(self, notifier: N) -> Self
    where
        N: Notify + 'static,
    {
        Self {
            notifier: Arc::new(notifier),
            ..self
        }
    }

    /// Authorizes every request with tokens from `tokens`.
    pub fn tokens<T>(self, tokens: T) -> Self
    where
        T: TokenSource + 'static,
    {
        Self {
            tokens: Some(Arc::new(tokens)),
            ..self
        }
    }

    /// Upgrades `http://` URLs to `https://`.
    pub fn ensure_https(self, ensure_https: bool) -> Self {
        Self {
            ensure_https,
            ..self
        }
    }

    /// Adds a custom interceptor before logging and caching.
    pub fn interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: Interceptor + 'static,
    {
        self.extra.push(Arc::new(interceptor));
        self
    }

    /// Assembles the chain in front of `transport`.
    pub fn build<H>(self, transport: H) -> Result<Relay, ConfigError>
    where
        H: Handler + 'static,
    {
        self.config.validate()?;

        let mut builder = Chain::builder();
        if self.ensure_https {
            builder = builder.interceptor(EnsureHttpsInterceptor);
        }
        builder = builder.interceptor(TrimNameInterceptor);
        if let Some(tokens) = self.tokens {
            builder = builder.interceptor(AuthInterceptor::new(tokens));
        }
        for interceptor in self.extra {
            builder = builder.shared_interceptor(interceptor);
        }
        let chain = builder
            .interceptor(LoggingInterceptor::new(Arc::clone(&self.notifier)))
            .interceptor(self.config.cache.interceptor(self.cache.clone())?)
            .interceptor(UploadInterceptor::new(
                self.config.upload.url.as_str(),
                self.config.upload.simulator()?,
                self.config.upload.total,
            ))
            .build(transport);
        debug!(interceptors = ?chain.interceptor_names(), "relay chain built");

        let handler: Arc<dyn Handler> = match self.config.retry.attempts {
            0 | 1 => Arc::new(chain.clone()),
            attempts => Arc::new(Retry::new(chain.clone(), attempts)),
        };

        Ok(Relay {
            config: self.config,
            chain,
            handler,
            cache: self.cache,
            notifier: self.notifier,
        })
    }
}

impl std::fmt::Debug for RelayBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayBuilder")
            .field("config", &self.config)
            .field("ensure_https", &self.ensure_https)
            .field("extra", &self.extra.len())
            .finish_non_exhaustive()
    }
}

/// A configured chain plus the services built on it.
#[derive(Clone)]
pub struct Relay {
    config: RelayConfig,
    chain: Chain,
    handler: Arc<dyn Handler>,
    cache: RequestCache,
    notifier: Arc<dyn Notify>,
}

impl Relay {
    /// Starts building from `config`.
    pub fn builder(config: RelayConfig) -> RelayBuilder {
        RelayBuilder {
            config,
            cache: RequestCache::default(),
            notifier: Arc::new(TracingNotifier),
            tokens: None,
            ensure_https: false,
            extra: Vec::new(),
        }
    }

    /// Runs `request` through the chain, with retries when configured.
    pub fn submit(&self, request: Request) -> EventStream {
        self.handler.handle(request)
    }

    /// The chain, without retries.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// The shared response cache.
    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// The configuration this relay was built from.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Search service on the configured endpoint.
    pub fn search<T>(&self) -> ChainSearch<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        ChainSearch::new(
            Arc::clone(&self.handler),
            self.config.search.url.as_str(),
            self.config.search.param.as_str(),
        )
    }

    /// Dispatcher over [`Relay::search`] with the configured debounce,
    /// reporting failures to the notifier.
    pub fn search_dispatcher<T>(&self) -> SearchDispatcher<ChainSearch<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        SearchDispatcher::new(self.search())
            .debounce(self.config.search.debounce)
            .reporter(ErrorReporter::from_shared(Arc::clone(&self.notifier)))
    }

    /// Uploader posting to the configured upload URL.
    pub fn uploader(&self) -> Uploader {
        Uploader::new(
            Arc::clone(&self.handler),
            self.config.upload.url.as_str(),
            Arc::clone(&self.notifier),
        )
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("chain", &self.chain)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
