//! Ordering, laziness and retry behaviour of built chains.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::{StreamExt, stream};
use http::{HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use relay_core::{
    Chain, Event, EventStream, EventStreamExt, Handler, Interceptor, Next, RelayError, Request,
    Response, Retry, handler_fn, interceptor_fn,
};

type Log = Arc<Mutex<Vec<String>>>;

/// Appends its name to the `x-trail` header on the way out and to the
/// `x-inbound` header of the response on the way back.
struct Tracer {
    name: &'static str,
    log: Log,
}

impl Interceptor for Tracer {
    fn name(&self) -> &str {
        self.name
    }

    fn intercept(&self, request: Request, next: Next) -> EventStream {
        self.log.lock().unwrap().push(format!("out:{}", self.name));

        let trail = match request.headers().get("x-trail") {
            Some(previous) => format!("{},{}", previous.to_str().unwrap(), self.name),
            None => self.name.to_owned(),
        };
        let request = request.with_header("x-trail", HeaderValue::from_str(&trail).unwrap());

        let name = self.name;
        let log = Arc::clone(&self.log);
        next.handle(request)
            .map(move |event| match event {
                Ok(Event::Response(response)) => {
                    log.lock().unwrap().push(format!("in:{name}"));
                    Ok(Event::Response(
                        response.append_header("x-inbound", HeaderValue::from_static(name)),
                    ))
                }
                other => other,
            })
            .boxed()
    }
}

fn recording_terminal(log: Log) -> impl Handler + 'static {
    handler_fn(move |request: Request| {
        let trail = request
            .headers()
            .get("x-trail")
            .map(|value| value.to_str().unwrap().to_owned())
            .unwrap_or_default();
        log.lock().unwrap().push(format!("terminal:{trail}"));
        stream::iter([
            Ok(Event::Sent),
            Ok(Event::Response(Response::new(StatusCode::OK))),
        ])
        .boxed()
    })
}

fn tracer(name: &'static str, log: &Log) -> Tracer {
    Tracer {
        name,
        log: Arc::clone(log),
    }
}

#[tokio::test]
async fn outbound_in_construction_order_inbound_in_reverse() {
    let log = Log::default();
    let chain = Chain::builder()
        .interceptor(tracer("A", &log))
        .interceptor(tracer("B", &log))
        .interceptor(tracer("C", &log))
        .build(recording_terminal(Arc::clone(&log)));

    assert_eq!(chain.interceptor_names(), vec!["A", "B", "C"]);

    let response = chain
        .submit(Request::get("http://localhost/users").build())
        .last_response()
        .await
        .unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "out:A",
            "out:B",
            "out:C",
            "terminal:A,B,C",
            "in:C",
            "in:B",
            "in:A",
        ]
    );

    let inbound: Vec<_> = response
        .headers()
        .get_all("x-inbound")
        .iter()
        .map(|value| value.to_str().unwrap())
        .collect();
    assert_eq!(inbound, vec!["C", "B", "A"]);
}

#[tokio::test]
async fn submit_is_lazy_and_every_submission_reruns_the_chain() {
    let log = Log::default();
    let chain = Chain::builder()
        .interceptor(tracer("A", &log))
        .build(recording_terminal(Arc::clone(&log)));
    let request = Request::get("http://localhost/users").build();

    let first = chain.submit(request.clone());
    let second = chain.submit(request.clone());
    assert!(log.lock().unwrap().is_empty());

    first.last_response().await.unwrap();
    second.last_response().await.unwrap();

    let terminal_calls = log
        .lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.starts_with("terminal"))
        .count();
    assert_eq!(terminal_calls, 2);
    assert!(request.headers().get("x-trail").is_none());
}

#[tokio::test]
async fn short_circuit_skips_the_rest_of_the_chain() {
    let log = Log::default();
    let chain = Chain::builder()
        .interceptor(interceptor_fn("short-circuit", |_request, _next| {
            stream::iter([Ok(Event::Response(Response::new(StatusCode::CREATED)))]).boxed()
        }))
        .interceptor(tracer("never", &log))
        .build(recording_terminal(Arc::clone(&log)));

    let response = chain
        .submit(Request::post("http://localhost/upload").build())
        .last_response()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn stream_stops_after_first_error() {
    let chain = Chain::builder().build(handler_fn(|_request| {
        stream::iter([
            Ok(Event::Sent),
            Err(RelayError::network(std::io::Error::other("connection reset"))),
            Ok(Event::Response(Response::new(StatusCode::OK))),
        ])
        .boxed()
    }));

    let events: Vec<_> = chain
        .submit(Request::get("http://localhost/").build())
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    assert!(matches!(events[1], Err(RelayError::Network(_))));
}

fn flaky_terminal(failures: usize, calls: Arc<AtomicUsize>) -> impl Handler + 'static {
    handler_fn(move |_request| {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        if call < failures {
            stream::iter([
                Ok(Event::Sent),
                Err(RelayError::transport(StatusCode::BAD_GATEWAY, "try again")),
            ])
            .boxed()
        } else {
            stream::iter([
                Ok(Event::Sent),
                Ok(Event::Response(Response::new(StatusCode::OK))),
            ])
            .boxed()
        }
    })
}

#[tokio::test]
async fn retry_reruns_every_interceptor_with_the_original_request() {
    let log = Log::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let chain = Chain::builder()
        .interceptor(tracer("A", &log))
        .build(flaky_terminal(2, Arc::clone(&calls)));

    let response = Retry::new(chain, 3)
        .handle(Request::get("http://localhost/users").build())
        .last_response()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let outbound = log
        .lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.as_str() == "out:A")
        .count();
    assert_eq!(outbound, 3);
}

#[tokio::test]
async fn retry_surfaces_the_last_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let chain = Chain::builder().build(flaky_terminal(usize::MAX, Arc::clone(&calls)));

    let result = Retry::new(chain, 3)
        .handle(Request::get("http://localhost/users").build())
        .last_response()
        .await;

    assert!(matches!(result, Err(RelayError::Transport { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_gives_up_on_client_errors() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let chain = Chain::builder().build(handler_fn(move |_request| {
        counter.fetch_add(1, Ordering::SeqCst);
        stream::iter([Err(RelayError::transport(StatusCode::NOT_FOUND, ""))]).boxed()
    }));

    let result = Retry::new(chain, 5)
        .handle(Request::get("http://localhost/missing").build())
        .last_response()
        .await;

    assert_eq!(result.unwrap_err().status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
