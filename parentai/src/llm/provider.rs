use async_trait::async_trait;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{ParentAiError, Result};
use crate::llm::api::LlmApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

/// One chat completion: system instruction plus a single user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A remote text-generation service.
///
/// Implementations make exactly one attempt per call and report failures
/// through [`ParentAiError`], with [`ParentAiError::is_transient`] telling the
/// caller whether another attempt may succeed.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// The configured completion backend.
#[derive(Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    client: Option<LlmApiClient>,
}

impl LlmProvider {
    pub fn new(config: &LlmConfig) -> Self {
        let (provider, _model) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            _ => {
                if let Some(base_url) = &config.base_url {
                    LlmBackend::OpenAICompatible {
                        base_url: base_url.clone(),
                    }
                } else {
                    LlmBackend::Unavailable {
                        reason: format!("Unknown provider in model: {}", config.model),
                    }
                }
            }
        };

        if let LlmBackend::Unavailable { reason } = backend {
            return Self::unavailable(&reason);
        }

        match LlmApiClient::new(config) {
            Ok(client) => Self {
                backend,
                client: Some(client),
            },
            Err(e) => Self::unavailable(&e.to_string()),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            client: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "LLM client not initialised".to_string(),
        }
    }
}

#[async_trait]
impl CompletionClient for LlmProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ParentAiError::LlmUnavailable(self.unavailable_reason()))?;
        client.complete(request).await
    }
}
