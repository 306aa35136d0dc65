//! Handlers turn a request into an event stream.

use std::sync::Arc;

use crate::{EventStream, Request};

/// Anything that turns a [`Request`] into a cold [`EventStream`].
///
/// Terminal transports, built [`Chain`](crate::Chain)s and wrappers like
/// [`Retry`](crate::Retry) all implement this trait.
///
/// # Contract
///
/// Each call starts a new execution: implementations must not share mutable
/// state between the streams they return. A terminal handler emits
/// [`Event::Sent`](crate::Event::Sent), zero or more progress events, then
/// exactly one [`Event::Response`](crate::Event::Response), or stops with an
/// error instead of the response.
pub trait Handler: Send + Sync {
    /// Starts handling `request`.
    fn handle(&self, request: Request) -> EventStream;
}

impl<H> Handler for Arc<H>
where
    H: Handler + ?Sized,
{
    fn handle(&self, request: Request) -> EventStream {
        (**self).handle(request)
    }
}

impl<H> Handler for Box<H>
where
    H: Handler + ?Sized,
{
    fn handle(&self, request: Request) -> EventStream {
        (**self).handle(request)
    }
}

/// Creates a [`Handler`] from a closure.
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> EventStream + Send + Sync,
{
    HandlerFn { f }
}

/// [`Handler`] backed by a closure. See [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerFn").finish()
    }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(Request) -> EventStream + Send + Sync,
{
    fn handle(&self, request: Request) -> EventStream {
        (self.f)(request)
    }
}
