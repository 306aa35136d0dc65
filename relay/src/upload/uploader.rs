use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use relay_core::{Event, Handler, RelayError, Request};
use tracing::{error, info};

use crate::{ErrorReporter, Notify};

/// Uploads files through a chain and narrates the progress.
#[derive(Clone)]
pub struct Uploader {
    handler: Arc<dyn Handler>,
    url: String,
    notifier: Arc<dyn Notify>,
}

impl Uploader {
    /// Uploads to `url` through `handler`, reporting to `notifier`.
    pub fn new<H, N>(handler: H, url: impl Into<String>, notifier: N) -> Self
    where
        H: Handler + 'static,
        N: Notify + 'static,
    {
        Self {
            handler: Arc::new(handler),
            url: url.into(),
            notifier: Arc::new(notifier),
        }
    }

    /// Posts `content` as `file_name` and returns the last progress message.
    ///
    /// Every event is turned into a message and notified. On failure, or
    /// when the stream ends without any event, the reason is notified and
    /// `"{file_name} upload failed."` is returned.
    pub async fn upload(&self, file_name: &str, content: Bytes) -> String {
        let size = content.len() as u64;
        let request = Request::post(self.url.as_str())
            .body(content)
            .report_progress(true)
            .build();

        let mut events = self.handler.handle(request);
        let mut last = None;
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    let message = event_message(file_name, size, &event);
                    self.notifier.notify(&message);
                    last = Some(message);
                }
                Err(err) => return self.failed(file_name, &err),
            }
        }

        match last {
            Some(last) => {
                info!(file = file_name, size, "upload finished");
                last
            }
            None => self.failed(file_name, &RelayError::Incomplete),
        }
    }

    fn failed(&self, file_name: &str, err: &RelayError) -> String {
        error!(file = file_name, error = %err, "upload failed");
        let failed = format!("{file_name} upload failed.");
        self.notifier
            .notify(&format!("{failed} {}", ErrorReporter::describe(err)));
        failed
    }
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader").field("url", &self.url).finish()
    }
}

fn event_message(file_name: &str, size: u64, event: &Event) -> String {
    match event {
        Event::Sent => format!("Uploading file \"{file_name}\" of size {size}."),
        Event::UploadProgress {
            loaded,
            total: Some(total),
        } if *total > 0 => {
            let percent = (100.0 * *loaded as f64 / *total as f64).round();
            format!("File \"{file_name}\" is {percent}% uploaded.")
        }
        Event::Response(_) => format!("File \"{file_name}\" was completely uploaded!"),
        other => format!("File \"{file_name}\" surprising upload event: {}.", other.kind()),
    }
}
