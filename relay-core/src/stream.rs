//! Stream adapters for event streams.

use std::future::Future;
use std::pin::{Pin, pin};
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, FusedStream};
use futures::{Stream, StreamExt, TryStreamExt, future, ready};
use pin_project::pin_project;

use crate::{Event, EventStream, RelayError, Response};

/// Defers building a stream until it is first polled.
pub(crate) fn deferred<F>(f: F) -> EventStream
where
    F: FnOnce() -> EventStream + Send + 'static,
{
    stream::once(async move { f() }).flatten().boxed()
}

/// Ends a stream right after its first error.
#[pin_project]
#[derive(Debug)]
pub struct TerminateOnError<S> {
    #[pin]
    inner: S,
    done: bool,
}

impl<S> TerminateOnError<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner, done: false }
    }
}

impl<S, T, E> Stream for TerminateOnError<S>
where
    S: Stream<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        match ready!(this.inner.poll_next(cx)) {
            Some(Err(error)) => {
                *this.done = true;
                Poll::Ready(Some(Err(error)))
            }
            Some(item) => Poll::Ready(Some(item)),
            None => {
                *this.done = true;
                Poll::Ready(None)
            }
        }
    }
}

impl<S, T, E> FusedStream for TerminateOnError<S>
where
    S: Stream<Item = Result<T, E>>,
{
    fn is_terminated(&self) -> bool {
        self.done
    }
}

/// Convenience methods for event streams.
pub trait EventStreamExt: Stream<Item = Result<Event, RelayError>> + Sized {
    /// Keeps only `Response` events.
    fn responses(self) -> BoxStream<'static, Result<Response, RelayError>>
    where
        Self: Send + 'static,
    {
        self.try_filter_map(|event| future::ready(Ok(event.into_response())))
            .boxed()
    }

    /// Drives the stream to completion and returns the last response.
    ///
    /// Fails with the stream's error, or with [`RelayError::Incomplete`] if
    /// the stream completed without a response.
    fn last_response(self) -> impl Future<Output = Result<Response, RelayError>> + Send
    where
        Self: Send,
    {
        async move {
            let mut events = pin!(self);
            let mut last = None;
            while let Some(event) = events.next().await {
                if let Event::Response(response) = event? {
                    last = Some(response);
                }
            }
            last.ok_or(RelayError::Incomplete)
        }
    }
}

impl<S> EventStreamExt for S where S: Stream<Item = Result<Event, RelayError>> {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;

    use super::*;

    #[tokio::test]
    async fn terminate_on_error_drops_trailing_events() {
        let events = stream::iter([
            Ok(Event::Sent),
            Err(RelayError::Incomplete),
            Ok(Event::Response(Response::new(StatusCode::OK))),
        ]);
        let collected: Vec<_> = TerminateOnError::new(events).collect().await;
        assert_eq!(collected.len(), 2);
        assert!(matches!(collected[1], Err(RelayError::Incomplete)));
    }

    #[tokio::test]
    async fn deferred_runs_nothing_until_polled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut events = deferred(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            stream::iter([Ok(Event::Sent)]).boxed()
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(events.next().await.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn last_response_requires_a_response() {
        let events = stream::iter([Ok(Event::Sent)]);
        assert!(matches!(
            events.last_response().await,
            Err(RelayError::Incomplete)
        ));
    }
}
