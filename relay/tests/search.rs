//! Timing behaviour of the search dispatcher, on a paused clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{StreamExt, stream};
use http::StatusCode;
use pretty_assertions::assert_eq;
use relay::search::{ResultStream, SearchDispatcher, SearchHandle, SearchResults, SearchService};
use relay::{ErrorReporter, MessageLog, RelayError};
use tokio::time::{sleep, timeout};

/// Answers `text` with `["{text}!"]` after `latency`. `"boom"` fails and
/// `"gone"` gives up as cancelled.
#[derive(Clone, Default)]
struct FakeSearch {
    calls: Arc<Mutex<Vec<String>>>,
    latency: Duration,
}

impl FakeSearch {
    fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SearchService for FakeSearch {
    type Item = String;

    fn search(&self, text: &str, _refresh: bool) -> ResultStream<String> {
        self.calls.lock().unwrap().push(text.to_owned());
        let text = text.to_owned();
        let latency = self.latency;
        stream::once(async move {
            sleep(latency).await;
            if text == "boom" {
                Err(RelayError::transport(StatusCode::BAD_GATEWAY, "upstream down"))
            } else if text == "gone" {
                Err(RelayError::Cancelled)
            } else {
                Ok(vec![format!("{text}!")])
            }
        })
        .boxed()
    }
}

fn spawn(service: &FakeSearch) -> (SearchHandle, SearchResults<String>) {
    SearchDispatcher::new(service.clone()).spawn()
}

/// Asserts that nothing is delivered within the next `window`.
async fn assert_quiet(results: &mut SearchResults<String>, window: Duration) {
    assert!(
        timeout(window, results.next()).await.is_err(),
        "unexpected delivery"
    );
}

#[tokio::test(start_paused = true)]
async fn keystrokes_within_the_debounce_window_collapse() {
    let service = FakeSearch::with_latency(Duration::from_millis(100));
    let (input, mut results) = spawn(&service);

    input.search("a").unwrap();
    sleep(Duration::from_millis(250)).await;
    input.search("ab").unwrap();

    assert_eq!(results.next().await, Some(vec!["ab!".to_owned()]));
    assert_eq!(service.calls(), vec!["ab"]);
}

#[tokio::test(start_paused = true)]
async fn nothing_is_sent_before_the_text_settles() {
    let service = FakeSearch::default();
    let (input, mut results) = spawn(&service);

    input.search("dom").unwrap();
    sleep(Duration::from_millis(499)).await;
    assert!(service.calls().is_empty());

    assert_eq!(results.next().await, Some(vec!["dom!".to_owned()]));
    assert_eq!(service.calls(), vec!["dom"]);
}

#[tokio::test(start_paused = true)]
async fn superseded_request_never_delivers() {
    let service = FakeSearch::with_latency(Duration::from_millis(300));
    let (input, mut results) = spawn(&service);

    input.search("a").unwrap();
    // "a" settles at 500ms and would answer at 800ms.
    sleep(Duration::from_millis(600)).await;
    input.search("ab").unwrap();

    assert_eq!(results.next().await, Some(vec!["ab!".to_owned()]));
    assert_eq!(service.calls(), vec!["a", "ab"]);
    assert_quiet(&mut results, Duration::from_secs(5)).await;
}

#[tokio::test(start_paused = true)]
async fn unchanged_text_is_not_searched_again() {
    let service = FakeSearch::default();
    let (input, mut results) = spawn(&service);

    input.search("re").unwrap();
    assert_eq!(results.next().await, Some(vec!["re!".to_owned()]));

    input.search("re").unwrap();
    assert_quiet(&mut results, Duration::from_secs(1)).await;

    input.search("react").unwrap();
    assert_eq!(results.next().await, Some(vec!["react!".to_owned()]));
    assert_eq!(service.calls(), vec!["re", "react"]);
}

#[tokio::test(start_paused = true)]
async fn blank_text_clears_without_a_request() {
    let service = FakeSearch::default();
    let (input, mut results) = spawn(&service);

    input.search("   ").unwrap();

    assert_eq!(results.next().await, Some(Vec::new()));
    assert!(service.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failures_deliver_an_empty_list_and_are_reported() {
    let service = FakeSearch::default();
    let log = MessageLog::new();
    let (input, mut results) = SearchDispatcher::new(service.clone())
        .reporter(ErrorReporter::new(log.clone()))
        .spawn();

    input.search("boom").unwrap();
    assert_eq!(results.next().await, Some(Vec::new()));
    assert_eq!(
        log.messages(),
        vec![r#"search failed: server returned code 502 with body "upstream down""#]
    );

    // A failure is not a delivery, so the same text is tried again.
    input.search("boom").unwrap();
    assert_eq!(results.next().await, Some(Vec::new()));
    assert_eq!(service.calls(), vec!["boom", "boom"]);
}

#[tokio::test(start_paused = true)]
async fn cancelled_searches_deliver_nothing_and_are_not_reported() {
    let service = FakeSearch::default();
    let log = MessageLog::new();
    let (input, mut results) = SearchDispatcher::new(service.clone())
        .reporter(ErrorReporter::new(log.clone()))
        .spawn();

    input.search("gone").unwrap();
    assert_quiet(&mut results, Duration::from_secs(1)).await;
    assert!(log.messages().is_empty());

    input.search("dom").unwrap();
    assert_eq!(results.next().await, Some(vec!["dom!".to_owned()]));
    assert_eq!(service.calls(), vec!["gone", "dom"]);
}

#[tokio::test(start_paused = true)]
async fn custom_debounce_is_honoured() {
    let service = FakeSearch::default();
    let (input, mut results) = SearchDispatcher::new(service.clone())
        .debounce(Duration::from_millis(50))
        .spawn();

    input.search("dom").unwrap();
    let delivered = timeout(Duration::from_millis(60), results.next()).await;

    assert_eq!(delivered.unwrap(), Some(vec!["dom!".to_owned()]));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_dispatcher() {
    let service = FakeSearch::default();
    let (input, mut results) = spawn(&service);

    input.search("dom").unwrap();
    drop(input);

    assert_eq!(results.next().await, None);
    assert!(service.calls().is_empty());
}
