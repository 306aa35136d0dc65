//! Search: a chain-backed search service and the dispatcher that turns
//! keystrokes into at most one live lookup.

mod dispatcher;
mod service;

pub use dispatcher::{
    DEFAULT_DEBOUNCE, DispatcherClosed, SearchDispatcher, SearchHandle, SearchResults,
};
pub use service::{ChainSearch, ResultStream, SearchService};
