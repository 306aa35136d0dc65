//! Bounded whole-chain retry.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tracing::warn;

use crate::{Event, EventStream, Handler, Request};

/// Re-runs a handler from scratch when its stream fails.
///
/// Each attempt starts from the request originally submitted, so every
/// interceptor of a wrapped [`Chain`](crate::Chain) runs again. Only
/// [retryable](crate::RelayError::is_retryable) errors are retried, and never
/// after a response has been delivered to the caller. The last error is
/// surfaced once `attempts` executions have failed.
#[derive(Debug, Clone)]
pub struct Retry<H> {
    inner: Arc<H>,
    attempts: u32,
}

impl<H> Retry<H> {
    /// Wraps `inner`, allowing up to `attempts` executions in total.
    ///
    /// An `attempts` value of zero is treated as one.
    pub fn new(inner: H, attempts: u32) -> Self {
        Self {
            inner: Arc::new(inner),
            attempts: attempts.max(1),
        }
    }

    /// Maximum number of executions per request.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

struct Attempts<H> {
    inner: Arc<H>,
    request: Request,
    attempt: u32,
    attempts: u32,
    current: Option<EventStream>,
    responded: bool,
    done: bool,
}

impl<H> Handler for Retry<H>
where
    H: Handler + 'static,
{
    fn handle(&self, request: Request) -> EventStream {
        let state = Attempts {
            inner: Arc::clone(&self.inner),
            request,
            attempt: 1,
            attempts: self.attempts,
            current: None,
            responded: false,
            done: false,
        };

        stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }
            loop {
                let current = state
                    .current
                    .get_or_insert_with(|| state.inner.handle(state.request.clone()));

                match current.next().await {
                    Some(Ok(event)) => {
                        if matches!(event, Event::Response(_)) {
                            state.responded = true;
                        }
                        return Some((Ok(event), state));
                    }
                    Some(Err(error))
                        if state.attempt < state.attempts
                            && !state.responded
                            && error.is_retryable() =>
                    {
                        warn!(
                            attempt = state.attempt,
                            attempts = state.attempts,
                            url = state.request.url(),
                            %error,
                            "request failed, retrying"
                        );
                        state.attempt += 1;
                        state.current = None;
                    }
                    Some(Err(error)) => {
                        state.done = true;
                        return Some((Err(error), state));
                    }
                    None => return None,
                }
            }
        })
        .boxed()
    }
}
