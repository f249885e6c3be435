use crate::tests::test_support::{
    TOKEN_PATH, base_config, capture_logs, drain_logs, manager, token_body,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

#[tokio::test(flavor = "current_thread")]
async fn non_success_clears_cache_and_next_call_retries() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(move |_req: &Request| {
            if calls_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#)
            } else {
                token_body("tok_after_failure", 3600)
            }
        })
        .expect(2)
        .mount(&server)
        .await;

    let (tokens, _clock) = manager(base_config(&server.uri()));

    let (lines, guard) = capture_logs();
    let first = tokens.get_token().await;
    drop(guard);

    assert_eq!(first, None);
    assert!(
        tokens.snapshot().await.is_none(),
        "failed refresh must leave the cache empty"
    );

    let logs = drain_logs(lines);
    assert!(
        logs.iter()
            .any(|line| line.contains("ERROR") && line.contains("401") && line.contains("invalid_client")),
        "expected the error response to be logged, got {:?}",
        logs
    );
    assert_eq!(
        logs.iter().filter(|line| line.contains("invalid_client")).count(),
        1,
        "response body should be logged once, got {:?}",
        logs
    );
    assert!(
        logs.iter()
            .any(|line| line.contains("refresh.failure") && line.contains("error_kind=provider")),
        "expected a provider failure event, got {:?}",
        logs
    );

    let second = tokens.get_token().await;
    assert_eq!(second.as_deref(), Some("tok_after_failure"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "current_thread")]
async fn success_status_without_access_token_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "expires_in": 3600 })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let (tokens, _clock) = manager(base_config(&server.uri()));

    assert_eq!(tokens.get_token().await, None);
    assert!(tokens.snapshot().await.is_none());
    assert_eq!(tokens.get_token().await, None);
}

#[tokio::test(flavor = "current_thread")]
async fn malformed_body_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let (tokens, _clock) = manager(base_config(&server.uri()));

    assert_eq!(tokens.get_token().await, None);
    assert!(tokens.snapshot().await.is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn unreachable_endpoint_is_a_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = base_config(&format!("http://127.0.0.1:{port}"));

    let (tokens, _clock) = manager(config);

    let (lines, guard) = capture_logs();
    let token = tokens.get_token().await;
    drop(guard);

    assert_eq!(token, None);
    assert!(tokens.snapshot().await.is_none());
    let logs = drain_logs(lines);
    assert!(
        logs.iter()
            .any(|line| line.contains("refresh.failure") && line.contains("error_kind=transport")),
        "expected a transport failure event, got {:?}",
        logs
    );
}
