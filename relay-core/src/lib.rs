#![warn(missing_docs)]
//! # relay-core
//!
//! Core types and the interceptor chain engine for the relay HTTP client
//! pipeline.
//!
//! This crate is **transport-agnostic**: it never opens a socket. Instead it
//! defines the value types flowing through a pipeline and the traits that
//! concrete transports and interceptors implement.
//!
//! ## Architecture
//!
//! - [`Request`] / [`Response`] - immutable values; "modifying" a request
//!   always produces a new value with specific fields overridden
//! - [`Event`] - one step of a transfer (`Sent`, progress, `Response`)
//! - [`Handler`] - anything turning a request into a cold [`EventStream`]
//! - [`Interceptor`] - a pipeline stage receiving the request together with
//!   the [`Next`] continuation
//! - [`Chain`] - fixed-order composition of interceptors ending in a
//!   terminal handler
//!
//! ## Ordering
//!
//! For a chain built from `[A, B, C]` the outbound request is seen by
//! `A`, then `B`, then `C`, then the terminal handler. Events flow back in
//! reverse: the terminal handler's stream is observed by `C` first and by
//! `A` last.
//!
//! ```
//! use relay_core::{Chain, Event, Request, Response, handler_fn};
//! use futures::{StreamExt, stream};
//! use http::StatusCode;
//!
//! let chain = Chain::builder().build(handler_fn(|_request| {
//!     stream::iter([
//!         Ok(Event::Sent),
//!         Ok(Event::Response(Response::new(StatusCode::OK))),
//!     ])
//!     .boxed()
//! }));
//!
//! let events = futures::executor::block_on(
//!     chain.submit(Request::get("http://localhost/users").build()).collect::<Vec<_>>(),
//! );
//! assert_eq!(events.len(), 2);
//! ```

mod chain;
mod error;
mod event;
mod handler;
mod interceptor;
mod request;
mod response;
mod retry;
pub mod service;
pub mod stream;

pub use chain::{Chain, ChainBuilder, Next};
pub use error::{BoxError, RelayError};
pub use event::{Event, EventStream};
pub use handler::{Handler, HandlerFn, handler_fn};
pub use interceptor::{Interceptor, InterceptorFn, interceptor_fn};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use retry::Retry;
pub use stream::EventStreamExt;
