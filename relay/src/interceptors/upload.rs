use relay_core::{EventStream, Interceptor, Next, Request};
use tracing::debug;

use crate::upload::UploadSimulator;

/// Answers upload requests with simulated progress instead of forwarding them.
///
/// A request is an upload when its URL starts with the configured upload
/// URL. The simulated size is the body length, or `fallback_total` when the
/// body is missing or empty.
#[derive(Debug, Clone)]
pub struct UploadInterceptor {
    url: String,
    simulator: UploadSimulator,
    fallback_total: u64,
}

impl UploadInterceptor {
    /// Simulates uploads to `url`.
    pub fn new(url: impl Into<String>, simulator: UploadSimulator, fallback_total: u64) -> Self {
        Self {
            url: url.into(),
            simulator,
            fallback_total,
        }
    }
}

impl Interceptor for UploadInterceptor {
    fn name(&self) -> &str {
        "upload"
    }

    fn intercept(&self, request: Request, next: Next) -> EventStream {
        if !request.url().starts_with(self.url.as_str()) {
            return next.handle(request);
        }

        let total = match request.body() {
            Some(body) if !body.is_empty() => body.len() as u64,
            _ => self.fallback_total,
        };
        debug!(url = request.url(), total, "simulating upload");
        self.simulator.events(total)
    }
}
