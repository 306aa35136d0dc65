use std::time::Duration;

use futures::{StreamExt, stream};
use http::StatusCode;
use relay_core::{Event, EventStream, Response};
use tracing::debug;

/// Fakes the event stream of an upload without a server.
///
/// For a total of `T` bytes split into `N` chunks of `ceil(T / N)` bytes the
/// stream yields `Sent` at once, then one `UploadProgress` per chunk while
/// the running total stays below `T`, then a single `201 Created` response.
/// Each step waits `delay` after the previous one was delivered, so steps
/// never overlap. Dropping the stream cancels the pending delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSimulator {
    chunks: u32,
    delay: Duration,
}

enum Step {
    Start,
    Uploading { loaded: u64 },
    Done,
}

impl UploadSimulator {
    /// Creates a simulator. A `chunks` value of zero is treated as one.
    pub fn new(chunks: u32, delay: Duration) -> Self {
        Self {
            chunks: chunks.max(1),
            delay,
        }
    }

    /// Number of chunks.
    pub fn chunks(&self) -> u32 {
        self.chunks
    }

    /// Delay between steps.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Bytes added per step for an upload of `total` bytes.
    pub fn chunk_size(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.chunks))
    }

    /// Event stream for an upload of `total` bytes.
    pub fn events(&self, total: u64) -> EventStream {
        let chunk = self.chunk_size(total);
        let delay = self.delay;

        stream::unfold(Step::Start, move |step| async move {
            match step {
                Step::Start => Some((Ok(Event::Sent), Step::Uploading { loaded: 0 })),
                Step::Uploading { loaded } => {
                    tokio::time::sleep(delay).await;
                    let loaded = loaded.saturating_add(chunk);
                    if loaded < total {
                        debug!(loaded, total, "simulated upload progress");
                        let progress = Event::UploadProgress {
                            loaded,
                            total: Some(total),
                        };
                        Some((Ok(progress), Step::Uploading { loaded }))
                    } else {
                        debug!(total, "simulated upload complete");
                        let done = Event::Response(Response::new(StatusCode::CREATED));
                        Some((Ok(done), Step::Done))
                    }
                }
                Step::Done => None,
            }
        })
        .boxed()
    }
}

impl Default for UploadSimulator {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(300))
    }
}
