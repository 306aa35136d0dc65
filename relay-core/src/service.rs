//! Tower integration.
//!
//! - [`Chain`] implements [`tower::Service`], so a built chain can be used
//!   wherever a tower service is expected.
//! - [`TowerTransport`] adapts any tower service answering a [`Request`] with
//!   a [`Response`] into a terminal [`Handler`].

use std::convert::Infallible;
use std::future::{Ready, poll_fn, ready};
use std::task::{Context, Poll};

use futures::{StreamExt, stream};
use tower::Service;

use crate::{Chain, Event, EventStream, Handler, RelayError, Request, Response};

impl Service<Request> for Chain {
    type Response = EventStream;
    type Error = Infallible;
    type Future = Ready<Result<EventStream, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        ready(Ok(self.submit(request)))
    }
}

/// Terminal handler backed by a tower service.
///
/// Emits [`Event::Sent`] before calling the service, then the response.
/// Non-2xx responses become [`RelayError::Transport`].
#[derive(Debug, Clone)]
pub struct TowerTransport<S> {
    service: S,
}

impl<S> TowerTransport<S> {
    /// Wraps `service`.
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

impl<S> Handler for TowerTransport<S>
where
    S: Service<Request, Response = Response, Error = RelayError> + Clone + Send + Sync + 'static,
    S::Future: Send,
{
    fn handle(&self, request: Request) -> EventStream {
        let mut service = self.service.clone();
        let response = async move {
            poll_fn(|cx| service.poll_ready(cx)).await?;
            let response = service.call(request).await?;
            if response.is_success() {
                Ok::<_, RelayError>(Event::Response(response))
            } else {
                Err(RelayError::transport(
                    response.status(),
                    response.body().clone(),
                ))
            }
        };

        stream::iter([Ok(Event::Sent)])
            .chain(stream::once(response))
            .boxed()
    }
}
