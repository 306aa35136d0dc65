//! Immutable request values.
//!
//! A [`Request`] is never mutated once handed to a chain. Interceptors that
//! need a different request use the `with_*` methods, which return a new
//! value and leave the original untouched. Retries therefore always start
//! from the request the caller submitted.

use bytes::Bytes;
use http::header::IntoHeaderName;
use http::{HeaderMap, HeaderValue, Method};

/// An outbound HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    url: String,
    params: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Bytes>,
    report_progress: bool,
    refresh: bool,
}

impl Request {
    /// Starts building a request with the given method and URL.
    pub fn builder(method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, url.into())
    }

    /// Starts building a `GET` request.
    pub fn get(url: impl Into<String>) -> RequestBuilder {
        Self::builder(Method::GET, url)
    }

    /// Starts building a `POST` request.
    pub fn post(url: impl Into<String>) -> RequestBuilder {
        Self::builder(Method::POST, url)
    }

    /// Starts building a `PUT` request.
    pub fn put(url: impl Into<String>) -> RequestBuilder {
        Self::builder(Method::PUT, url)
    }

    /// Starts building a `DELETE` request.
    pub fn delete(url: impl Into<String>) -> RequestBuilder {
        Self::builder(Method::DELETE, url)
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL without query parameters.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query parameters in insertion order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request body, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Whether the transport should emit progress events.
    pub fn report_progress(&self) -> bool {
        self.report_progress
    }

    /// Whether a cached response should be revalidated against the server.
    pub fn refresh(&self) -> bool {
        self.refresh
    }

    /// URL with the query parameters appended.
    pub fn url_with_params(&self) -> String {
        match serde_urlencoded::to_string(&self.params) {
            Ok(query) if !query.is_empty() => {
                let separator = if self.url.ends_with(['?', '&']) {
                    ""
                } else if self.url.contains('?') {
                    "&"
                } else {
                    "?"
                };
                format!("{}{}{}", self.url, separator, query)
            }
            _ => self.url.clone(),
        }
    }

    /// Returns a copy with the URL replaced.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with the header set, replacing any previous values.
    pub fn with_header<K>(&self, name: K, value: HeaderValue) -> Self
    where
        K: IntoHeaderName,
    {
        let mut headers = self.headers.clone();
        headers.insert(name, value);
        Self {
            headers,
            ..self.clone()
        }
    }

    /// Returns a copy with all headers replaced.
    pub fn with_headers(&self, headers: HeaderMap) -> Self {
        Self {
            headers,
            ..self.clone()
        }
    }

    /// Returns a copy with the body replaced.
    pub fn with_body(&self, body: impl Into<Bytes>) -> Self {
        Self {
            body: Some(body.into()),
            ..self.clone()
        }
    }

    /// Returns a copy without a body.
    pub fn without_body(&self) -> Self {
        Self {
            body: None,
            ..self.clone()
        }
    }

    /// Returns a copy with the refresh flag replaced.
    pub fn with_refresh(&self, refresh: bool) -> Self {
        Self {
            refresh,
            ..self.clone()
        }
    }
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    fn new(method: Method, url: String) -> Self {
        Self {
            request: Request {
                method,
                url,
                params: Vec::new(),
                headers: HeaderMap::new(),
                body: None,
                report_progress: false,
                refresh: false,
            },
        }
    }

    /// Appends a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.params.push((key.into(), value.into()));
        self
    }

    /// Appends a header value, keeping previous values for the same name.
    pub fn header<K>(mut self, name: K, value: HeaderValue) -> Self
    where
        K: IntoHeaderName,
    {
        self.request.headers.append(name, value);
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// Asks the transport for progress events.
    pub fn report_progress(mut self, report_progress: bool) -> Self {
        self.request.report_progress = report_progress;
        self
    }

    /// Asks the cache to revalidate.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.request.refresh = refresh;
        self
    }

    /// Finishes the request.
    pub fn build(self) -> Request {
        self.request
    }
}
