use relay_core::{EventStream, Interceptor, Next, Request};
use tracing::debug;

/// Passes every request on untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInterceptor;

impl Interceptor for NoopInterceptor {
    fn name(&self) -> &str {
        "noop"
    }

    fn intercept(&self, request: Request, next: Next) -> EventStream {
        debug!(url = request.url(), "noop");
        next.handle(request)
    }
}
