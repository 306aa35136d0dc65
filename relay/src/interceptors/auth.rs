use std::sync::Arc;

use http::HeaderValue;
use http::header::AUTHORIZATION;
use relay_core::{EventStream, Interceptor, Next, Request};
use tracing::{debug, warn};

/// Supplies the current authorization token.
///
/// The interceptor asks for a token on every request and never stores it.
pub trait TokenSource: Send + Sync {
    /// Current token, or `None` when unauthenticated.
    fn token(&self) -> Option<String>;
}

impl<T> TokenSource for Arc<T>
where
    T: TokenSource + ?Sized,
{
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}

/// A token that never changes.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Sets the `Authorization` header from a [`TokenSource`].
#[derive(Clone)]
pub struct AuthInterceptor {
    tokens: Arc<dyn TokenSource>,
}

impl AuthInterceptor {
    /// Takes tokens from `tokens`.
    pub fn new<T>(tokens: T) -> Self
    where
        T: TokenSource + 'static,
    {
        Self {
            tokens: Arc::new(tokens),
        }
    }
}

impl std::fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInterceptor").finish_non_exhaustive()
    }
}

impl Interceptor for AuthInterceptor {
    fn name(&self) -> &str {
        "auth"
    }

    fn intercept(&self, request: Request, next: Next) -> EventStream {
        let Some(token) = self.tokens.token() else {
            debug!(url = request.url(), "no token, forwarding without authorization");
            return next.handle(request);
        };

        match HeaderValue::from_str(&token) {
            Ok(mut value) => {
                value.set_sensitive(true);
                next.handle(request.with_header(AUTHORIZATION, value))
            }
            Err(error) => {
                warn!(url = request.url(), %error, "token is not a valid header value");
                next.handle(request)
            }
        }
    }
}
