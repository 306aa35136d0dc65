use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use futures::ready;
use pin_project::pin_project;
use relay_core::{Event, EventStream, Interceptor, Next, RelayError, Request};
use tokio::time::Instant;
use tracing::info;

use crate::Notify;

/// Times each exchange and notifies how it ended.
///
/// Exactly one message is sent per execution, when the stream completes,
/// fails or is dropped early:
///
/// `GET "http://localhost/users?name=dom" succeeded in 12 ms.`
///
/// The outcome is `succeeded` once a response went through, `failed` on an
/// error or when the stream ends without a response, and `cancelled` when
/// the stream is dropped before either.
#[derive(Clone)]
pub struct LoggingInterceptor {
    notifier: Arc<dyn Notify>,
}

impl LoggingInterceptor {
    /// Notifies `notifier`.
    pub fn new<N>(notifier: N) -> Self
    where
        N: Notify + 'static,
    {
        Self {
            notifier: Arc::new(notifier),
        }
    }
}

impl std::fmt::Debug for LoggingInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingInterceptor").finish_non_exhaustive()
    }
}

impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &str {
        "logging"
    }

    fn intercept(&self, request: Request, next: Next) -> EventStream {
        let report = Report {
            notifier: Arc::clone(&self.notifier),
            line: format!("{} \"{}\"", request.method(), request.url_with_params()),
            started: Instant::now(),
            responded: false,
            sent: false,
        };
        Box::pin(Timed {
            inner: next.handle(request),
            report,
        })
    }
}

struct Report {
    notifier: Arc<dyn Notify>,
    line: String,
    started: Instant,
    responded: bool,
    sent: bool,
}

impl Report {
    fn send(&mut self, outcome: &str) {
        if self.sent {
            return;
        }
        self.sent = true;
        let elapsed = self.started.elapsed().as_millis();
        let message = format!("{} {outcome} in {elapsed} ms.", self.line);
        info!(target: "relay::logging", "{message}");
        self.notifier.notify(&message);
    }
}

impl Drop for Report {
    fn drop(&mut self) {
        let outcome = if self.responded {
            "succeeded"
        } else {
            "cancelled"
        };
        self.send(outcome);
    }
}

#[pin_project]
struct Timed<S> {
    #[pin]
    inner: S,
    report: Report,
}

impl<S> Stream for Timed<S>
where
    S: Stream<Item = Result<Event, RelayError>>,
{
    type Item = Result<Event, RelayError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let item = ready!(this.inner.poll_next(cx));
        match &item {
            Some(Ok(Event::Response(_))) => this.report.responded = true,
            Some(Ok(_)) => {}
            Some(Err(_)) => this.report.send("failed"),
            None if this.report.responded => this.report.send("succeeded"),
            None => this.report.send("failed"),
        }
        Poll::Ready(item)
    }
}
