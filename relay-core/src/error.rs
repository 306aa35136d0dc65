//! Error taxonomy for pipeline executions.

use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

/// Boxed error used as the cause of network failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single chain execution.
///
/// An event stream that yields a `RelayError` yields nothing afterwards and
/// never yields a terminal [`Response`](crate::Response) event.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request reached the server and the server replied with a failure.
    #[error("server returned code {} with body \"{}\"", .status.as_u16(), String::from_utf8_lossy(.body))]
    Transport {
        /// Status code of the failed reply.
        status: StatusCode,
        /// Raw body of the failed reply.
        body: Bytes,
    },

    /// The request never reached the server or never completed.
    #[error("network error: {0}")]
    Network(#[source] BoxError),

    /// The operation was superseded by a newer one.
    ///
    /// A source that gives up on its own ends its stream with this. The
    /// search dispatcher drops such results without delivering anything,
    /// and error reporting never notifies it.
    #[error("request was superseded")]
    Cancelled,

    /// Response body did not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The event stream completed without a terminal response.
    #[error("event stream ended without a response")]
    Incomplete,
}

impl RelayError {
    /// Creates a [`RelayError::Transport`] from a failed server reply.
    pub fn transport(status: StatusCode, body: impl Into<Bytes>) -> Self {
        RelayError::Transport {
            status,
            body: body.into(),
        }
    }

    /// Creates a [`RelayError::Network`] from any error cause.
    pub fn network(cause: impl Into<BoxError>) -> Self {
        RelayError::Network(cause.into())
    }

    /// Status code of the server reply, if the request reached the server.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RelayError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if re-running the whole chain may succeed.
    ///
    /// Network failures and server-side (5xx) failures are retryable.
    /// Client errors, decoding errors and cancellations are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            RelayError::Network(_) => true,
            RelayError::Transport { status, .. } => status.is_server_error(),
            RelayError::Cancelled | RelayError::Decode(_) | RelayError::Incomplete => false,
        }
    }

    /// Returns `true` for [`RelayError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RelayError::Cancelled)
    }
}
