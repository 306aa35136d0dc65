//! Failure reporting.

use std::sync::Arc;

use relay_core::RelayError;
use tracing::{debug, error};

use crate::Notify;

/// Turns failures into notifications a user can read.
#[derive(Clone)]
pub struct ErrorReporter {
    notifier: Arc<dyn Notify>,
}

impl ErrorReporter {
    /// Reports through `notifier`.
    pub fn new<N>(notifier: N) -> Self
    where
        N: Notify + 'static,
    {
        Self {
            notifier: Arc::new(notifier),
        }
    }

    /// Reports through an already shared notifier.
    pub fn from_shared(notifier: Arc<dyn Notify>) -> Self {
        Self { notifier }
    }

    /// Short description of `error` without internals.
    ///
    /// Server errors read `server returned code {status} with body "{body}"`;
    /// network errors are described by their cause.
    pub fn describe(error: &RelayError) -> String {
        match error {
            RelayError::Network(cause) => cause.to_string(),
            other => other.to_string(),
        }
    }

    /// Logs `error` and notifies `"{operation} failed: {message}"`.
    ///
    /// Cancellations are not failures the user caused or can act on, so they
    /// are only logged.
    pub fn report(&self, operation: &str, error: &RelayError) {
        if error.is_cancelled() {
            debug!(operation, "operation cancelled");
            return;
        }
        error!(operation, %error, "operation failed");
        self.notifier
            .notify(&format!("{operation} failed: {}", Self::describe(error)));
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter").finish_non_exhaustive()
    }
}
