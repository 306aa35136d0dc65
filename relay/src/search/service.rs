use std::marker::PhantomData;
use std::sync::Arc;

use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use relay_core::{EventStreamExt, Handler, RelayError, Request};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Stream of result lists for one query.
///
/// Usually a single list; a stale-while-revalidate lookup yields the cached
/// list first and the fresh one second.
pub type ResultStream<T> = BoxStream<'static, Result<Vec<T>, RelayError>>;

/// Runs one search query.
pub trait SearchService: Send + Sync + 'static {
    /// A single search hit.
    type Item: Send + 'static;

    /// Starts a lookup for `text`. Nothing happens until the stream is polled.
    fn search(&self, text: &str, refresh: bool) -> ResultStream<Self::Item>;
}

impl<S> SearchService for Arc<S>
where
    S: SearchService + ?Sized,
{
    type Item = S::Item;

    fn search(&self, text: &str, refresh: bool) -> ResultStream<S::Item> {
        (**self).search(text, refresh)
    }
}

/// Searches by sending `GET {url}?{param}={text}` through a handler and
/// decoding every response body as a JSON list of `T`.
///
/// Blank text yields one empty list without touching the handler.
pub struct ChainSearch<T> {
    handler: Arc<dyn Handler>,
    url: String,
    param: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> ChainSearch<T> {
    /// Searches `url` through `handler`, sending the text as `param`.
    pub fn new<H>(handler: H, url: impl Into<String>, param: impl Into<String>) -> Self
    where
        H: Handler + 'static,
    {
        Self {
            handler: Arc::new(handler),
            url: url.into(),
            param: param.into(),
            _item: PhantomData,
        }
    }

    /// The request issued for `text`.
    pub fn request(&self, text: &str, refresh: bool) -> Request {
        Request::get(self.url.as_str())
            .param(self.param.as_str(), text)
            .refresh(refresh)
            .build()
    }
}

impl<T> Clone for ChainSearch<T> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            url: self.url.clone(),
            param: self.param.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for ChainSearch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSearch")
            .field("url", &self.url)
            .field("param", &self.param)
            .finish()
    }
}

impl<T> SearchService for ChainSearch<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    fn search(&self, text: &str, refresh: bool) -> ResultStream<T> {
        if text.trim().is_empty() {
            debug!("blank search text, skipping request");
            return stream::iter([Ok(Vec::new())]).boxed();
        }

        self.handler
            .handle(self.request(text, refresh))
            .responses()
            .and_then(|response| async move { response.json::<Vec<T>>() })
            .boxed()
    }
}
