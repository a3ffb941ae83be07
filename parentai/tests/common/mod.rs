#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use serde_json::json;

use parentai::classify::{AgeGrouper, TopicClassifier};
use parentai::config::{AssistantConfig, EmbeddingsConfig, LlmConfig};
use parentai::knowledge::KnowledgeBase;
use parentai::llm::{CompletionClient, GeneratorSettings, PromptAssembler, ResponseGenerator};
use parentai::models::AgeScheme;
use parentai::services::ParentingAssistant;
use parentai::session::InMemorySessionStore;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn llm_config(base_url: String) -> LlmConfig {
    LlmConfig {
        model: "openai/gpt-4o-mini".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        timeout_secs: 5,
        ..LlmConfig::default()
    }
}

pub fn embeddings_config(base_url: String) -> EmbeddingsConfig {
    EmbeddingsConfig {
        model: "openai/text-embedding-3-small".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        timeout_secs: 5,
        max_retries: 0,
        batch_size: 64,
    }
}

pub fn fast_settings(max_attempts: u32) -> GeneratorSettings {
    GeneratorSettings {
        max_attempts,
        base_delay: Duration::from_millis(1),
        timeout: Duration::from_secs(5),
        max_tokens: 1000,
        temperature: 0.7,
    }
}

pub fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {
            "prompt_tokens": 1,
            "completion_tokens": 1,
            "total_tokens": 2
        }
    })
}

pub fn api_error_body(message: &str, error_type: &str, code: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": serde_json::Value::Null,
            "code": code
        }
    })
}

/// Embeds each input on a crying axis and a sleep axis.
pub fn axis_embedding(text: &str) -> Vec<f32> {
    let text = text.to_lowercase();
    vec![
        if text.contains("cry") { 1.0 } else { 0.0 },
        if text.contains("sleep") { 1.0 } else { 0.0 },
        0.1,
    ]
}

/// Embedding endpoint body for the inputs of a captured request.
pub fn embedding_body_for(request: &wiremock::Request) -> serde_json::Value {
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap_or_default();
    let inputs = body["input"].as_array().cloned().unwrap_or_default();
    json!({
        "data": inputs
            .iter()
            .map(|input| json!({ "embedding": axis_embedding(input.as_str().unwrap_or("")) }))
            .collect::<Vec<_>>()
    })
}

pub fn assistant_with(client: Arc<dyn CompletionClient>, max_attempts: u32) -> ParentingAssistant {
    let assembler = PromptAssembler::new(&AssistantConfig::default());
    ParentingAssistant::new(
        AgeGrouper::new(AgeScheme::Detailed),
        TopicClassifier::embedded().expect("embedded keywords"),
        Arc::new(KnowledgeBase::embedded().expect("embedded knowledge")),
        ResponseGenerator::new(client, fast_settings(max_attempts), assembler.clone()),
        assembler,
        Arc::new(InMemorySessionStore::new()),
    )
}
