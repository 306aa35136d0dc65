//! Debounced, switch-latest search dispatcher.
//!
//! Raw keystrokes go in through a [`SearchHandle`]; result lists come out of
//! [`SearchResults`]. In between, a spawned task runs this state machine:
//!
//! ```text
//!            input                      quiet for `debounce`
//!   Idle ─────────────▶ Pending ───────────────────────────▶ settle
//!                        ▲   │ input: restart timer
//!                        └───┘
//!
//!   settle: blank text        → deliver [] ─────────────────▶ Idle
//!           same as delivered → ─────────────────────────────▶ Idle
//!           otherwise         → issue request ───────────────▶ InFlight
//!
//!   InFlight: list   → deliver, remember text (stay for a second list)
//!             error  → deliver [] unless something was delivered ─▶ Idle
//!             cancelled → ────────────────────────────────────▶ Idle
//!             done   → ──────────────────────────────────────▶ Idle
//!             input  → drop the request ─────────────────────▶ Pending
//! ```
//!
//! A superseded request is dropped, never polled again, so it can neither
//! deliver a list nor write to a cache.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{Stream, StreamExt};
use pin_project::pin_project;
use relay_core::RelayError;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Sleep, sleep};
use tracing::{Instrument, debug, info_span};

use super::{ResultStream, SearchService};
use crate::ErrorReporter;

/// Default quiet period before a query settles.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// The dispatcher task has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("search dispatcher has stopped")]
pub struct DispatcherClosed;

#[derive(Debug)]
struct Query {
    text: String,
    refresh: bool,
}

/// Sends raw search text to a running dispatcher.
///
/// Clones feed the same dispatcher. The dispatcher stops, dropping any
/// pending timer and in-flight request, once every handle is dropped.
#[derive(Debug, Clone)]
pub struct SearchHandle {
    input: mpsc::UnboundedSender<Query>,
}

impl SearchHandle {
    /// Feeds the current search text.
    pub fn search(&self, text: impl Into<String>) -> Result<(), DispatcherClosed> {
        self.send(text.into(), false)
    }

    /// Feeds the current search text, asking caches to revalidate.
    pub fn search_with_refresh(&self, text: impl Into<String>) -> Result<(), DispatcherClosed> {
        self.send(text.into(), true)
    }

    fn send(&self, text: String, refresh: bool) -> Result<(), DispatcherClosed> {
        self.input
            .send(Query { text, refresh })
            .map_err(|_| DispatcherClosed)
    }
}

/// Result lists delivered by a dispatcher, in delivery order.
///
/// Ends when the dispatcher stops.
#[pin_project]
#[derive(Debug)]
pub struct SearchResults<T> {
    output: mpsc::UnboundedReceiver<Vec<T>>,
}

impl<T> Stream for SearchResults<T> {
    type Item = Vec<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Vec<T>>> {
        self.project().output.poll_recv(cx)
    }
}

/// Configures and starts a dispatcher.
#[derive(Debug)]
pub struct SearchDispatcher<S> {
    service: S,
    debounce: Duration,
    reporter: Option<ErrorReporter>,
}

impl<S> SearchDispatcher<S>
where
    S: SearchService,
{
    /// Dispatches queries to `service` with the default debounce.
    pub fn new(service: S) -> Self {
        Self {
            service,
            debounce: DEFAULT_DEBOUNCE,
            reporter: None,
        }
    }

    /// Sets the quiet period before a query settles.
    pub fn debounce(self, debounce: Duration) -> Self {
        Self { debounce, ..self }
    }

    /// Reports failed lookups through `reporter`.
    pub fn reporter(self, reporter: ErrorReporter) -> Self {
        Self {
            reporter: Some(reporter),
            ..self
        }
    }

    /// Spawns the dispatcher on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(self) -> (SearchHandle, SearchResults<S::Item>) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        let worker = Worker {
            service: self.service,
            debounce: self.debounce,
            reporter: self.reporter,
            input: input_rx,
            output: output_tx,
            last_delivered: None,
            next_id: 0,
        };
        let span = info_span!("search_dispatcher", debounce = ?self.debounce);
        tokio::spawn(worker.run().instrument(span));

        (
            SearchHandle { input: input_tx },
            SearchResults { output: output_rx },
        )
    }
}

enum State<T> {
    Idle,
    Pending {
        query: Query,
        timer: Pin<Box<Sleep>>,
    },
    InFlight {
        text: String,
        id: u64,
        results: ResultStream<T>,
        delivered: bool,
    },
}

enum Wake<T> {
    Input(Option<Query>),
    Settled,
    Results(Option<Result<Vec<T>, RelayError>>),
}

struct Worker<S: SearchService> {
    service: S,
    debounce: Duration,
    reporter: Option<ErrorReporter>,
    input: mpsc::UnboundedReceiver<Query>,
    output: mpsc::UnboundedSender<Vec<S::Item>>,
    last_delivered: Option<String>,
    next_id: u64,
}

impl<S: SearchService> Worker<S> {
    async fn run(mut self) {
        let mut state = State::Idle;
        loop {
            let next = match state {
                State::Idle => match self.input.recv().await {
                    Some(query) => Some(self.pending(query)),
                    None => None,
                },
                State::Pending { query, mut timer } => {
                    let wake: Wake<S::Item> = tokio::select! {
                        biased;
                        received = self.input.recv() => Wake::Input(received),
                        () = timer.as_mut() => Wake::Settled,
                    };
                    match wake {
                        Wake::Input(Some(query)) => Some(self.pending(query)),
                        Wake::Settled => self.settle(query),
                        _ => None,
                    }
                }
                State::InFlight {
                    text,
                    id,
                    mut results,
                    delivered,
                } => {
                    let wake: Wake<S::Item> = tokio::select! {
                        biased;
                        received = self.input.recv() => Wake::Input(received),
                        item = results.next() => Wake::Results(item),
                    };
                    match wake {
                        Wake::Input(Some(query)) => {
                            debug!(id, superseded = %text, "request superseded");
                            Some(self.pending(query))
                        }
                        Wake::Results(Some(Ok(list))) => {
                            debug!(id, text = %text, hits = list.len(), "delivering results");
                            self.last_delivered = Some(text.clone());
                            self.deliver(list).then_some(State::InFlight {
                                text,
                                id,
                                results,
                                delivered: true,
                            })
                        }
                        Wake::Results(Some(Err(RelayError::Cancelled))) => {
                            debug!(id, text = %text, "search cancelled by its service");
                            Some(State::Idle)
                        }
                        Wake::Results(Some(Err(error))) => {
                            debug!(id, text = %text, %error, "search failed");
                            if let Some(reporter) = &self.reporter {
                                reporter.report("search", &error);
                            }
                            if delivered || self.deliver(Vec::new()) {
                                Some(State::Idle)
                            } else {
                                None
                            }
                        }
                        Wake::Results(None) => {
                            debug!(id, "request finished");
                            Some(State::Idle)
                        }
                        _ => None,
                    }
                }
            };

            match next {
                Some(next) => state = next,
                None => break,
            }
        }
        debug!("search dispatcher stopped");
    }

    fn pending(&self, query: Query) -> State<S::Item> {
        debug!(text = %query.text, "query pending");
        State::Pending {
            query,
            timer: Box::pin(sleep(self.debounce)),
        }
    }

    /// Returns `None` when the results receiver is gone.
    fn settle(&mut self, query: Query) -> Option<State<S::Item>> {
        if query.text.trim().is_empty() {
            debug!("blank query settled, clearing results");
            self.last_delivered = Some(query.text);
            return self.deliver(Vec::new()).then_some(State::Idle);
        }
        if self.last_delivered.as_deref() == Some(query.text.as_str()) {
            debug!(text = %query.text, "query unchanged, skipping");
            return Some(State::Idle);
        }

        let id = self.next_id;
        self.next_id += 1;
        debug!(id, text = %query.text, refresh = query.refresh, "issuing search");
        let results = self.service.search(&query.text, query.refresh);
        Some(State::InFlight {
            text: query.text,
            id,
            results,
            delivered: false,
        })
    }

    /// Returns `false` when the results receiver is gone.
    fn deliver(&self, list: Vec<S::Item>) -> bool {
        self.output.send(list).is_ok()
    }
}
