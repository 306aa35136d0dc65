//! # relay
//!
//! An interceptor-chain HTTP client pipeline. Requests pass through an
//! ordered chain of interceptors (request rewriting, auth, logging, response
//! caching, simulated uploads) before reaching a pluggable transport. On top
//! of the chain sit an uploader that narrates progress and a debounced,
//! switch-latest search dispatcher.
//!
//! The crate never opens sockets itself: any [`Handler`] can be the
//! transport, including a tower service wrapped in
//! [`service::TowerTransport`].
//!
//! ```no_run
//! use futures::StreamExt;
//! use relay::{Relay, RelayConfig, Request, Response, handler_fn, Event};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RelayConfig::from_yaml(r#"
//! cache:
//!   prefixes: ["http://localhost:8080/users"]
//!   refresh_header: x-refresh
//! "#)?;
//!
//! let relay = Relay::builder(config).build(handler_fn(|_request| {
//!     futures::stream::iter([
//!         Ok(Event::Sent),
//!         Ok(Event::Response(Response::new(http::StatusCode::OK).with_body("[]"))),
//!     ])
//!     .boxed()
//! }))?;
//!
//! let (input, mut results) = relay.search_dispatcher::<String>().spawn();
//! input.search("dom")?;
//! let users = results.next().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
pub mod config;
pub mod interceptors;
mod notify;
mod report;
pub mod search;
pub mod upload;

pub use relay_cache as cache;
pub use relay_core::{
    BoxError, Chain, ChainBuilder, Event, EventStream, EventStreamExt, Handler, Interceptor,
    Next, RelayError, Request, RequestBuilder, Response, Retry, handler_fn, interceptor_fn,
    service,
};

pub use client::{Relay, RelayBuilder};
pub use config::{ConfigError, RelayConfig};
pub use notify::{MessageLog, Notify, TracingNotifier};
pub use report::ErrorReporter;
