//! Interceptor chain engine.
//!
//! A [`Chain`] is an ordered, immutable list of interceptors ending in a
//! terminal [`Handler`]. The order is fixed when the chain is built.
//!
//! Every stage is entered lazily: calling [`Chain::submit`] only describes
//! the execution, and the first interceptor runs when the returned stream
//! is first polled. Each submission re-runs the whole chain, so a retry of
//! the same request executes every interceptor again.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::stream::{TerminateOnError, deferred};
use crate::{EventStream, Handler, Interceptor, Request};

struct Pipeline {
    interceptors: Vec<Arc<dyn Interceptor>>,
    terminal: Arc<dyn Handler>,
}

/// Continuation to the rest of the chain.
///
/// Handed to every [`Interceptor::intercept`] call. Calling [`Next::handle`]
/// forwards a request to the following interceptor, or to the terminal
/// handler when no interceptors are left.
#[derive(Clone)]
pub struct Next {
    pipeline: Arc<Pipeline>,
    position: usize,
}

impl Next {
    /// Forwards `request` to the rest of the chain.
    pub fn handle(self, request: Request) -> EventStream {
        let Next { pipeline, position } = self;
        let interceptor = pipeline.interceptors.get(position).cloned();

        match interceptor {
            Some(interceptor) => {
                let next = Next {
                    pipeline,
                    position: position + 1,
                };
                deferred(move || {
                    debug!(
                        interceptor = interceptor.name(),
                        position,
                        method = %request.method(),
                        url = request.url(),
                        "intercepting request"
                    );
                    interceptor.intercept(request, next)
                })
            }
            None => {
                let terminal = Arc::clone(&pipeline.terminal);
                deferred(move || {
                    debug!(
                        method = %request.method(),
                        url = request.url(),
                        "handing request to terminal handler"
                    );
                    terminal.handle(request)
                })
            }
        }
    }

    /// Number of interceptors between this continuation and the terminal handler.
    pub fn remaining(&self) -> usize {
        self.pipeline.interceptors.len() - self.position
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("position", &self.position)
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// An ordered composition of interceptors and a terminal handler.
///
/// Cloning a chain is cheap and shares the same interceptors.
#[derive(Clone)]
pub struct Chain {
    pipeline: Arc<Pipeline>,
}

impl Chain {
    /// Creates a new [`ChainBuilder`].
    pub fn builder() -> ChainBuilder {
        ChainBuilder::default()
    }

    /// Builds a chain from an ordered list of interceptors and a terminal handler.
    pub fn new<H>(interceptors: Vec<Arc<dyn Interceptor>>, terminal: H) -> Self
    where
        H: Handler + 'static,
    {
        Chain {
            pipeline: Arc::new(Pipeline {
                interceptors,
                terminal: Arc::new(terminal),
            }),
        }
    }

    /// Runs `request` through the chain.
    ///
    /// The returned stream is cold and stops after the first error.
    pub fn submit(&self, request: Request) -> EventStream {
        let next = Next {
            pipeline: Arc::clone(&self.pipeline),
            position: 0,
        };
        Box::pin(TerminateOnError::new(next.handle(request)))
    }

    /// Names of the interceptors in construction order.
    pub fn interceptor_names(&self) -> Vec<&str> {
        self.pipeline
            .interceptors
            .iter()
            .map(|interceptor| interceptor.name())
            .collect()
    }

    /// Number of interceptors.
    pub fn len(&self) -> usize {
        self.pipeline.interceptors.len()
    }

    /// Returns `true` if the chain has no interceptors.
    pub fn is_empty(&self) -> bool {
        self.pipeline.interceptors.is_empty()
    }
}

impl Handler for Chain {
    fn handle(&self, request: Request) -> EventStream {
        self.submit(request)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("interceptors", &self.interceptor_names())
            .finish()
    }
}

/// Builder for [`Chain`].
///
/// Interceptors run on the outbound leg in the order they are added.
#[derive(Default)]
pub struct ChainBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ChainBuilder {
    /// Appends an interceptor.
    pub fn interceptor<I>(self, interceptor: I) -> Self
    where
        I: Interceptor + 'static,
    {
        self.shared_interceptor(Arc::new(interceptor))
    }

    /// Appends an interceptor that is shared with other chains.
    pub fn shared_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Finishes the chain with its terminal handler.
    pub fn build<H>(self, terminal: H) -> Chain
    where
        H: Handler + 'static,
    {
        Chain::new(self.interceptors, terminal)
    }
}

impl fmt::Debug for ChainBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}
