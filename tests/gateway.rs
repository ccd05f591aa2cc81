use gitaguide::error::{FALLBACK_DETAIL, RATE_LIMIT_NOTICE};
use gitaguide::{ChatClient, ChatGateway, GatewayError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A base URL nothing is listening on
fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_success_reply_is_returned_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "message": "How to find peace?",
            "language": "en",
            "mood": "Anxious"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Seek stillness...",
            "relevant_verses": [
                {
                    "chapter": 2,
                    "verse": 48,
                    "text": "Perform your duty, abandoning attachment.",
                    "shloka": "योगस्थः कुरु कर्माणि",
                    "transliteration": "yoga-sthah kuru karmani"
                }
            ],
            "language": "en"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::new(&server.uri());
    let reply = client
        .send_turn("How to find peace?", "en", "Anxious")
        .await
        .unwrap();

    assert_eq!(reply.response, "Seek stillness...");
    assert_eq!(reply.language, "en");
    assert_eq!(reply.relevant_verses.len(), 1);
    let verse = &reply.relevant_verses[0];
    assert_eq!((verse.chapter, verse.verse), (2, 48));
    assert_eq!(verse.shloka.as_deref(), Some("योगस्थः कुरु कर्माणि"));
    assert!(verse.hindi_translation.is_none());
}

#[tokio::test]
async fn test_rate_limit_ignores_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"detail": "5 per 1 minute"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = ChatClient::new(&server.uri())
        .send_turn("hello", "en", "Neutral")
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::RateLimited));
    assert_eq!(err.to_string(), RATE_LIMIT_NOTICE);
}

#[tokio::test]
async fn test_server_detail_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "model unavailable"})),
        )
        .mount(&server)
        .await;

    let err = ChatClient::new(&server.uri())
        .send_turn("hello", "en", "Neutral")
        .await
        .unwrap_err();

    match err {
        GatewayError::ServerRejected(detail) => assert_eq!(detail, "model unavailable"),
        other => panic!("expected ServerRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_or_unreadable_detail_uses_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = ChatClient::new(&server.uri())
        .send_turn("hello", "en", "Neutral")
        .await
        .unwrap_err();
    assert!(matches!(&err, GatewayError::ServerRejected(d) if d == FALLBACK_DETAIL));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let err = ChatClient::new(&server.uri())
        .send_turn("hello", "en", "Neutral")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), FALLBACK_DETAIL);
}

#[tokio::test]
async fn test_no_response_is_transport_failure() {
    let err = ChatClient::new(&dead_url())
        .send_turn("hello", "en", "Neutral")
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn test_undecodable_success_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "wrong shape"})))
        .mount(&server)
        .await;

    let err = ChatClient::new(&server.uri())
        .send_turn("hello", "en", "Neutral")
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::MalformedReply(_)));
}

#[tokio::test]
async fn test_exactly_one_attempt_per_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::new(&server.uri());
    assert!(client.send_turn("hello", "en", "Neutral").await.is_err());
    // MockServer verifies the call count on drop
}

#[tokio::test]
async fn test_health_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let client = ChatClient::new(&format!("{}/", server.uri()));
    assert_eq!(client.health().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_health_failure_uses_same_classification() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"detail": "warming up"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = ChatClient::new(&server.uri()).health().await.unwrap_err();
    assert!(matches!(&err, GatewayError::ServerRejected(d) if d == "warming up"));

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = ChatClient::new(&server.uri()).health().await.unwrap_err();
    assert!(matches!(err, GatewayError::RateLimited));
}
