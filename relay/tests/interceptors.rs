use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{StreamExt, stream};
use http::StatusCode;
use http::header::AUTHORIZATION;
use pretty_assertions::assert_eq;
use relay::interceptors::{
    AuthInterceptor, EnsureHttpsInterceptor, LoggingInterceptor, NoopInterceptor, StaticToken,
    TokenSource, TrimNameInterceptor,
};
use relay::{
    Chain, ChainBuilder, Event, EventStreamExt, MessageLog, RelayError, Request, Response,
    handler_fn,
};

type Seen = Arc<Mutex<Vec<Request>>>;

/// Terminal that records every request it receives and answers 200.
fn recording_chain(
    seen: &Seen,
    build: impl FnOnce(ChainBuilder) -> ChainBuilder,
) -> Chain {
    let seen = Arc::clone(seen);
    build(Chain::builder()).build(handler_fn(move |request: Request| {
        seen.lock().unwrap().push(request);
        stream::iter([
            Ok(Event::Sent),
            Ok(Event::Response(Response::new(StatusCode::OK))),
        ])
        .boxed()
    }))
}

#[tokio::test]
async fn rewriting_interceptors_leave_the_original_alone() {
    let seen = Seen::default();
    let chain = recording_chain(&seen, |builder| {
        builder
            .interceptor(NoopInterceptor)
            .interceptor(EnsureHttpsInterceptor)
            .interceptor(TrimNameInterceptor)
            .interceptor(AuthInterceptor::new(StaticToken::new("some-auth-token")))
    });
    let original = Request::post("http://localhost:8080/heroes")
        .body(r#"{"name":"  Magneta  "}"#)
        .build();

    chain.submit(original.clone()).last_response().await.unwrap();

    let forwarded = seen.lock().unwrap().pop().unwrap();
    assert_eq!(forwarded.url(), "https://localhost:8080/heroes");
    assert_eq!(forwarded.headers()[AUTHORIZATION], "some-auth-token");
    assert_eq!(forwarded.body().unwrap().as_ref(), br#"{"name":"Magneta"}"#);

    assert_eq!(original.url(), "http://localhost:8080/heroes");
    assert!(original.headers().is_empty());
    assert_eq!(original.body().unwrap().as_ref(), br#"{"name":"  Magneta  "}"#);
}

struct SignedOut;

impl TokenSource for SignedOut {
    fn token(&self) -> Option<String> {
        None
    }
}

#[tokio::test]
async fn auth_without_token_forwards_untouched() {
    let seen = Seen::default();
    let chain = recording_chain(&seen, |builder| {
        builder.interceptor(AuthInterceptor::new(SignedOut))
    });

    chain
        .submit(Request::get("https://localhost/users").build())
        .last_response()
        .await
        .unwrap();

    assert!(seen.lock().unwrap()[0].headers().get(AUTHORIZATION).is_none());
}

#[tokio::test]
async fn https_urls_are_not_rewritten() {
    let seen = Seen::default();
    let chain = recording_chain(&seen, |builder| builder.interceptor(EnsureHttpsInterceptor));

    chain
        .submit(Request::get("https://localhost/users").build())
        .last_response()
        .await
        .unwrap();

    assert_eq!(seen.lock().unwrap()[0].url(), "https://localhost/users");
}

/// Logged chain whose terminal answers `status` after `delay`; failures
/// become transport errors.
fn delayed(log: &MessageLog, delay: Duration, status: StatusCode) -> Chain {
    Chain::builder()
        .interceptor(LoggingInterceptor::new(log.clone()))
        .build(handler_fn(move |_request| {
            stream::iter([Ok(Event::Sent)])
                .chain(stream::once(async move {
                    tokio::time::sleep(delay).await;
                    if status.is_success() {
                        Ok(Event::Response(Response::new(status)))
                    } else {
                        Err(RelayError::transport(status, ""))
                    }
                }))
                .boxed()
        }))
}

#[tokio::test(start_paused = true)]
async fn logging_reports_success_with_elapsed_time() {
    let log = MessageLog::new();
    let chain = delayed(&log, Duration::from_millis(120), StatusCode::OK);

    chain
        .submit(
            Request::get("http://localhost:8080/users")
                .param("name", "dom")
                .build(),
        )
        .last_response()
        .await
        .unwrap();

    assert_eq!(
        log.messages(),
        vec![r#"GET "http://localhost:8080/users?name=dom" succeeded in 120 ms."#]
    );
}

#[tokio::test(start_paused = true)]
async fn logging_reports_failure() {
    let log = MessageLog::new();
    let chain = delayed(&log, Duration::from_millis(40), StatusCode::NOT_FOUND);

    let result = chain
        .submit(Request::delete("http://localhost:8080/heroes/7").build())
        .last_response()
        .await;

    assert!(result.is_err());
    assert_eq!(
        log.messages(),
        vec![r#"DELETE "http://localhost:8080/heroes/7" failed in 40 ms."#]
    );
}

#[tokio::test(start_paused = true)]
async fn logging_reports_cancellation_once() {
    let log = MessageLog::new();
    let chain = delayed(&log, Duration::from_secs(10), StatusCode::OK);

    let mut events = chain.submit(Request::get("http://localhost:8080/users").build());
    assert_eq!(events.next().await.unwrap().unwrap(), Event::Sent);
    tokio::time::sleep(Duration::from_millis(5)).await;
    drop(events);

    assert_eq!(
        log.messages(),
        vec![r#"GET "http://localhost:8080/users" cancelled in 5 ms."#]
    );
}
