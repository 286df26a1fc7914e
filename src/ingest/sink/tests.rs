use super::*;
use crate::chat::ChatMessage;
use crate::ingest::normalize::{DatetimeSource, NormalizedMessage};
use chrono::{TimeZone, Utc};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store(url: &str, idempotent: bool) -> StoreConfig {
    StoreConfig {
        url: url.to_string(),
        api_key: "anon-key".to_string(),
        idempotent,
        ..StoreConfig::default()
    }
}

fn one_batch() -> Batch {
    Batch {
        index: 2,
        records: vec![NormalizedMessage {
            message: ChatMessage {
                sender: Some("Lana".into()),
                date: Some("29/08/25".into()),
                time: Some("1:02 am".into()),
                text: Some("hi".into()),
                ..ChatMessage::default()
            },
            datetime: Utc.with_ymd_and_hms(2025, 8, 29, 1, 2, 0).unwrap(),
            source: DatetimeSource::Parsed,
            content_key: "abc".into(),
        }],
    }
}

#[test]
fn test_endpoint_joins_table() {
    let sink = RestSink::new(&store("https://p.supabase.co/rest/v1/", false));
    assert_eq!(sink.endpoint(), "https://p.supabase.co/rest/v1/messages");
}

#[tokio::test]
async fn test_insert_sends_headers_and_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("apikey", "anon-key"))
        .and(header("Authorization", "Bearer anon-key"))
        .and(header("Prefer", "return=minimal"))
        .and(body_json(serde_json::json!([{
            "sender": "Lana",
            "date": "29/08/25",
            "time": "1:02 am",
            "text": "hi",
            "datetime": "2025-08-29T01:02:00.000Z"
        }])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let sink = RestSink::new(&StoreConfig {
        url: server.uri(),
        api_key: "anon-key".to_string(),
        ..StoreConfig::default()
    });
    sink.insert(&one_batch()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_insert_idempotent_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(query_param("on_conflict", "content_key"))
        .and(header_exists("Prefer"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let sink = RestSink::new(&store(&server.uri(), true));
    sink.insert(&one_batch()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].headers.get("Prefer").unwrap().to_str().unwrap(),
        "return=minimal,resolution=ignore-duplicates"
    );
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body[0]["content_key"], "abc");
}

#[tokio::test]
async fn test_insert_http_error_maps_to_batch_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"message":"column \"x\" missing"}"#),
        )
        .mount(&server)
        .await;

    let sink = RestSink::new(&store(&server.uri(), false));
    let err = sink.insert(&one_batch()).await.unwrap_err();
    match err {
        KeepsakeError::Batch {
            index,
            status,
            reason,
            body,
        } => {
            assert_eq!(index, 2);
            assert_eq!(status, Some(400));
            assert_eq!(reason, "Bad Request");
            assert!(body.contains("missing"));
        }
        other => panic!("expected Batch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_insert_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let sink = RestSink::new(&store(&server.uri(), false));
    let err = sink.insert(&one_batch()).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_insert_transport_error_has_no_status() {
    // Nothing listens on port 9 on the test host
    let sink = RestSink::new(&store("http://127.0.0.1:9", false));
    let err = sink.insert(&one_batch()).await.unwrap_err();
    assert!(matches!(err, KeepsakeError::Batch { status: None, .. }));
    assert!(err.is_retryable());
}
