#![cfg(feature = "qdrant")]

use std::sync::Arc;

use async_trait::async_trait;
use convo::error::{ConvoError, ErrorKind};
use convo::provider::EmbeddingProvider;
use convo::vector_log::qdrant::{QdrantRecorder, QdrantSettings};
use convo::vector_log::ExchangeRecorder;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FixedEmbedder(Vec<f32>);

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _model: &str, _input: &str) -> Result<Vec<f32>, ConvoError> {
        Ok(self.0.clone())
    }
}

fn recorder(server: &MockServer, embedding: Vec<f32>) -> QdrantRecorder {
    QdrantRecorder::new(
        QdrantSettings {
            url: format!("{}/", server.uri()),
            api_key: Some("qdrant-key".to_string()),
            collection: "chat_history".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
        },
        Arc::new(FixedEmbedder(embedding)),
    )
}

#[tokio::test]
async fn record_creates_collection_once_and_upserts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections/chat_history/exists"))
        .and(header("api-key", "qdrant-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": { "exists": false } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/collections/chat_history"))
        .and(body_partial_json(json!({
            "vectors": { "size": 3, "distance": "Cosine" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/collections/chat_history/points"))
        .and(query_param("wait", "true"))
        .and(body_partial_json(json!({
            "points": [{
                "vector": [0.5, 0.25, 0.125],
                "payload": { "user": "hi", "assistant": "hello", "label": "Conv1" }
            }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": { "status": "completed" } })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let recorder = recorder(&server, vec![0.5, 0.25, 0.125]);
    recorder.record("hi", "hello", "Conv1").await.unwrap();
    recorder.record("hi", "hello", "Conv1").await.unwrap();
}

#[tokio::test]
async fn existing_collection_is_not_recreated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections/chat_history/exists"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": { "exists": true } })),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/collections/chat_history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/collections/chat_history/points"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": {} })))
        .expect(1)
        .mount(&server)
        .await;

    recorder(&server, vec![1.0])
        .record("q", "a", "Conv2")
        .await
        .unwrap();
}

#[tokio::test]
async fn upsert_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections/chat_history/exists"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": { "exists": true } })),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/collections/chat_history/points"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = recorder(&server, vec![1.0])
        .record("q", "a", "Conv1")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
}

#[tokio::test]
async fn empty_embedding_is_rejected_before_any_request() {
    let server = MockServer::start().await;

    let err = recorder(&server, Vec::new())
        .record("q", "a", "Conv1")
        .await
        .unwrap_err();
    assert!(matches!(err, ConvoError::Api { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn history_pages_through_scroll_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collections/chat_history/points/scroll"))
        .and(body_partial_json(json!({ "offset": "page-2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "points": [{
                    "id": "b",
                    "payload": {
                        "user": "first", "assistant": "one", "label": "Conv1",
                        "timestamp": "2026-01-01T10:00:00Z"
                    }
                }],
                "next_page_offset": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/collections/chat_history/points/scroll"))
        .and(body_partial_json(json!({
            "filter": { "must": [{ "key": "label", "match": { "value": "Conv1" } }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "points": [{
                    "id": "a",
                    "payload": {
                        "user": "second", "assistant": "two", "label": "Conv1",
                        "timestamp": "2026-01-01T11:00:00Z"
                    }
                }],
                "next_page_offset": "page-2"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let history = recorder(&server, vec![1.0]).history("Conv1").await.unwrap();
    let users: Vec<&str> = history.iter().map(|e| e.user.as_str()).collect();
    assert_eq!(users, vec!["first", "second"]);
}
