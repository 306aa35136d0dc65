//! Transfer events.

use futures::stream::BoxStream;

use crate::{RelayError, Response};

/// Stream of events produced by a single chain execution.
///
/// Streams are cold: nothing happens until the stream is polled, and every
/// call that produces a stream starts a fresh execution.
pub type EventStream = BoxStream<'static, Result<Event, RelayError>>;

/// One step of a transfer.
///
/// A successful stream ends with a `Response` event; a failed one ends with
/// an error and carries no `Response`.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The request was handed to the transport.
    Sent,
    /// Part of the request body was uploaded.
    UploadProgress {
        /// Bytes uploaded so far.
        loaded: u64,
        /// Total bytes to upload, when known.
        total: Option<u64>,
    },
    /// Part of the response body was downloaded.
    DownloadProgress {
        /// Bytes downloaded so far.
        loaded: u64,
        /// Total bytes to download, when known.
        total: Option<u64>,
    },
    /// The response.
    Response(Response),
}

impl Event {
    /// Returns the response carried by a `Response` event.
    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Event::Response(response) => Some(response),
            _ => None,
        }
    }

    /// Converts a `Response` event into its response.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Event::Response(response) => Some(response),
            _ => None,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Sent => "sent",
            Event::UploadProgress { .. } => "upload_progress",
            Event::DownloadProgress { .. } => "download_progress",
            Event::Response(_) => "response",
        }
    }
}

impl From<Response> for Event {
    fn from(response: Response) -> Self {
        Event::Response(response)
    }
}
