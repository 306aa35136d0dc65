use relay_core::{EventStream, Interceptor, Next, Request};
use serde_json::Value;
use tracing::debug;

/// Trims whitespace around the `name` field of JSON object bodies.
///
/// Requests without a body, with a non-JSON body, or without a non-empty
/// string `name` pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimNameInterceptor;

fn trimmed_body(request: &Request) -> Option<Vec<u8>> {
    let mut body: Value = serde_json::from_slice(request.body()?).ok()?;
    let name = body.as_object_mut()?.get_mut("name")?;
    let trimmed = match name.as_str() {
        Some(raw) if !raw.is_empty() && raw.trim() != raw => raw.trim().to_owned(),
        _ => return None,
    };
    *name = Value::String(trimmed);
    serde_json::to_vec(&body).ok()
}

impl Interceptor for TrimNameInterceptor {
    fn name(&self) -> &str {
        "trim-name"
    }

    fn intercept(&self, request: Request, next: Next) -> EventStream {
        match trimmed_body(&request) {
            Some(body) => {
                debug!(url = request.url(), "trimmed name in request body");
                next.handle(request.with_body(body))
            }
            None => next.handle(request),
        }
    }
}
