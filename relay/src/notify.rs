//! User-facing notifications.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

/// Receives human-readable status messages.
///
/// Notification never fails and never blocks on the caller.
pub trait Notify: Send + Sync {
    /// Records `message`.
    fn notify(&self, message: &str);
}

impl<N> Notify for Arc<N>
where
    N: Notify + ?Sized,
{
    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}

/// Keeps every message in memory, in arrival order.
///
/// Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MessageLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forgets all messages.
    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notify for MessageLog {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}

/// Emits messages as `info` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(target: "relay::notify", "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_messages() {
        let log = MessageLog::new();
        let shared: Arc<dyn Notify> = Arc::new(log.clone());

        shared.notify("first");
        shared.notify("second");
        assert_eq!(log.messages(), vec!["first", "second"]);

        log.clear();
        assert!(log.messages().is_empty());
    }
}
