//! Pipeline stages.

use crate::{EventStream, Next, Request};

/// A named pipeline stage.
///
/// An interceptor receives the request and the continuation to the rest of
/// the chain. It may:
///
/// - forward the request unchanged: `next.handle(request)`
/// - forward a modified copy: `next.handle(request.with_url(..))`
/// - short-circuit by returning its own stream without calling `next`
///
/// and may inspect or transform the events of the stream it returns.
///
/// # Example
///
/// ```
/// use relay_core::{EventStream, Interceptor, Next, Request};
///
/// struct EnsureGet;
///
/// impl Interceptor for EnsureGet {
///     fn name(&self) -> &str {
///         "ensure-get"
///     }
///
///     fn intercept(&self, request: Request, next: Next) -> EventStream {
///         next.handle(request)
///     }
/// }
/// ```
pub trait Interceptor: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handles `request`, usually by delegating to `next`.
    fn intercept(&self, request: Request, next: Next) -> EventStream;
}

/// Creates an [`Interceptor`] from a name and a closure.
pub fn interceptor_fn<F>(name: impl Into<String>, f: F) -> InterceptorFn<F>
where
    F: Fn(Request, Next) -> EventStream + Send + Sync,
{
    InterceptorFn {
        name: name.into(),
        f,
    }
}

/// [`Interceptor`] backed by a closure. See [`interceptor_fn`].
pub struct InterceptorFn<F> {
    name: String,
    f: F,
}

impl<F> std::fmt::Debug for InterceptorFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorFn")
            .field("name", &self.name)
            .finish()
    }
}

impl<F> Interceptor for InterceptorFn<F>
where
    F: Fn(Request, Next) -> EventStream + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn intercept(&self, request: Request, next: Next) -> EventStream {
        (self.f)(request, next)
    }
}
