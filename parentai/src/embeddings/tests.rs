//! Tests for the OpenAI-compatible embeddings client.
//!
//! Covers request shape, auth header handling, retry on 429 and 5xx,
//! no retry on 401/403, batching and the `Embedder` trait surface.

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::embeddings::api::{ApiConfig, EmbeddingApiClient};
use crate::embeddings::Embedder;
use crate::error::ParentAiError;

fn test_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        api_key: Some("test-api-key".to_string()),
        model: "text-embedding-3-small".to_string(),
        timeout_secs: 10,
        max_retries: 3,
        batch_size: 64,
    }
}

fn embedding_response(embeddings: Vec<Vec<f32>>) -> serde_json::Value {
    json!({
        "data": embeddings.into_iter().map(|e| json!({ "embedding": e })).collect::<Vec<_>>()
    })
}

// =============================================================================
// Success and request format
// =============================================================================

#[tokio::test]
async fn test_api_client_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.1, 0.2, 0.3]])),
        )
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let embeddings = client.embed_batch(&["test text"]).await.unwrap();
    assert_eq!(embeddings, vec![vec![0.1, 0.2, 0.3]]);
}

#[tokio::test]
async fn test_api_client_request_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_json(json!({
            "model": "text-embedding-3-small",
            "input": ["Tummy time for three minutes"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.1, 0.2, 0.3]])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let result = client.embed_batch(&["Tummy time for three minutes"]).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_api_client_no_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.1, 0.2, 0.3]])),
        )
        .mount(&mock_server)
        .await;

    let config = ApiConfig {
        api_key: None,
        ..test_config(&mock_server.uri())
    };

    let client = EmbeddingApiClient::new(config).unwrap();
    assert!(client.embed_batch(&["test"]).await.is_ok());

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_api_client_count_mismatch_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.1, 0.2]])),
        )
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let result = client.embed_batch(&["one", "two"]).await;
    assert!(matches!(result, Err(ParentAiError::Embedding(_))));
}

// =============================================================================
// Retry behaviour
// =============================================================================

#[tokio::test]
async fn test_api_client_rate_limit_retry() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));

    // First two requests return 429, third succeeds
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&attempt_count);
            move |_: &wiremock::Request| {
                let attempt = count.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    ResponseTemplate::new(429)
                        .set_body_json(json!({ "error": "rate limited" }))
                        .insert_header("retry-after", "1")
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(embedding_response(vec![vec![0.1, 0.2, 0.3]]))
                }
            }
        })
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let result = client.embed_batch(&["test"]).await;
    assert!(result.is_ok(), "Should succeed after retry");
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_api_client_rate_limit_exhausts_retries() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&attempt_count);
            move |_: &wiremock::Request| {
                count.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(429).set_body_json(json!({ "error": "rate limited" }))
            }
        })
        .mount(&mock_server)
        .await;

    let config = ApiConfig {
        max_retries: 2,
        ..test_config(&mock_server.uri())
    };

    let client = EmbeddingApiClient::new(config).unwrap();
    let result = client.embed_batch(&["test"]).await;

    // 1 initial + 2 retries
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    assert!(matches!(result, Err(ParentAiError::ApiRateLimit { .. })));
}

#[tokio::test]
async fn test_api_client_server_error_retry() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&attempt_count);
            move |_: &wiremock::Request| {
                let attempt = count.fetch_add(1, Ordering::SeqCst);
                if attempt < 1 {
                    ResponseTemplate::new(503)
                        .set_body_json(json!({ "error": "service unavailable" }))
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(embedding_response(vec![vec![0.1, 0.2, 0.3]]))
                }
            }
        })
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let result = client.embed_batch(&["test"]).await;
    assert!(result.is_ok(), "Should succeed after 503 retry");
    assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_api_client_auth_error_no_retry() {
    for status in [401, 403] {
        let mock_server = MockServer::start().await;
        let attempt_count = Arc::new(AtomicUsize::new(0));

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with({
                let count = Arc::clone(&attempt_count);
                move |_: &wiremock::Request| {
                    count.fetch_add(1, Ordering::SeqCst);
                    ResponseTemplate::new(status).set_body_json(json!({ "error": "invalid api key" }))
                }
            })
            .mount(&mock_server)
            .await;

        let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

        let result = client.embed_batch(&["test"]).await;
        assert!(matches!(result, Err(ParentAiError::ApiAuth(_))));
        assert_eq!(
            attempt_count.load(Ordering::SeqCst),
            1,
            "Should NOT retry on {status}"
        );
    }
}

#[tokio::test]
async fn test_api_client_bad_request_no_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(400).set_body_string("input too long"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let err = client.embed_batch(&["test"]).await.unwrap_err();
    assert!(err.to_string().contains("input too long"));
}

// =============================================================================
// Embedder trait
// =============================================================================

#[tokio::test]
async fn test_embedder_splits_into_batches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_json(json!({"model": "text-embedding-3-small", "input": ["a", "b"]})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(embedding_response(vec![vec![1.0, 0.0], vec![0.0, 1.0]])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_json(json!({"model": "text-embedding-3-small", "input": ["c"]})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.5, 0.5]])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ApiConfig {
        batch_size: 2,
        ..test_config(&mock_server.uri())
    };
    let client = EmbeddingApiClient::new(config).unwrap();

    let embeddings = client
        .embed(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        .await
        .unwrap();
    assert_eq!(
        embeddings,
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]
    );
}

#[tokio::test]
async fn test_embedder_empty_input_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();
    assert!(client.embed(Vec::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_embed_query_returns_single_vector() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_json(json!({
            "model": "text-embedding-3-small",
            "input": ["Why does my baby cry at night?"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.3, 0.4]])),
        )
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let vector = client
        .embed_query("Why does my baby cry at night?")
        .await
        .unwrap();
    assert_eq!(vector, vec![0.3, 0.4]);
    assert!(client.model_id().ends_with("#text-embedding-3-small"));
}
