use relay_core::{EventStream, Interceptor, Next, Request};
use tracing::debug;

/// Forwards `http://` requests as `https://`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsureHttpsInterceptor;

impl Interceptor for EnsureHttpsInterceptor {
    fn name(&self) -> &str {
        "ensure-https"
    }

    fn intercept(&self, request: Request, next: Next) -> EventStream {
        match request.url().strip_prefix("http://") {
            Some(rest) => {
                let secure = request.with_url(format!("https://{rest}"));
                debug!(from = request.url(), to = secure.url(), "upgraded to https");
                next.handle(secure)
            }
            None => next.handle(request),
        }
    }
}
