//! Stock interceptors.
//!
//! | interceptor              | effect                                              |
//! |--------------------------|-----------------------------------------------------|
//! | [`NoopInterceptor`]      | forwards the request untouched                      |
//! | [`AuthInterceptor`]      | sets `Authorization` from a [`TokenSource`]         |
//! | [`EnsureHttpsInterceptor`] | rewrites `http://` URLs to `https://`             |
//! | [`TrimNameInterceptor`]  | trims the `name` field of JSON object bodies        |
//! | [`LoggingInterceptor`]   | times the exchange and notifies the outcome         |
//! | [`UploadInterceptor`]    | answers uploads with the simulator                  |
//!
//! The caching interceptor lives in [`relay_cache`].

mod auth;
mod https;
mod logging;
mod noop;
mod trim_name;
mod upload;

pub use auth::{AuthInterceptor, StaticToken, TokenSource};
pub use https::EnsureHttpsInterceptor;
pub use logging::LoggingInterceptor;
pub use noop::NoopInterceptor;
pub use trim_name::TrimNameInterceptor;
pub use upload::UploadInterceptor;
