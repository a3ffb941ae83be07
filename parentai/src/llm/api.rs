use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};

use crate::{
    config::{parse_llm_provider_model, LlmConfig},
    error::{ParentAiError, Result},
    llm::provider::CompletionRequest,
};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

#[derive(Debug, Clone)]
struct ApiConfig {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
}

/// OpenAI-compatible chat completions. One attempt per call; retry policy
/// lives in [`crate::llm::ResponseGenerator`].
#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    config: ApiConfig,
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_config = ApiConfig::from_llm_config(config);

        let (provider, _) = parse_llm_provider_model(&config.model);
        let needs_api_key = !matches!(
            provider.to_lowercase().as_str(),
            "ollama" | "local" | "lmstudio"
        );

        if needs_api_key && api_config.api_key.is_none() {
            return Err(ParentAiError::LlmUnavailable(
                "API key required for this provider".to_string(),
            ));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_base(api_config.base_url.clone())
            .with_api_key(api_config.api_key.clone().unwrap_or_default());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api_config.timeout_secs))
            .build()
            .map_err(|error| {
                ParentAiError::Llm(format!("Failed to create LLM HTTP client: {error}"))
            })?;

        // async-openai retries 429 and 5xx internally; give up after the
        // first failure so every attempt is counted by the caller.
        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self {
            client,
            config: api_config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if request.user_message.trim().is_empty() {
            return Err(ParentAiError::Validation("Question cannot be empty".to_string()));
        }

        let chat_request = self.build_request(request)?;

        match self.client.chat().create(chat_request).await {
            Ok(response) => Self::extract_content(response),
            Err(error) => {
                if let Some(rate_limit_error) = Self::rate_limit_error(&error) {
                    return Err(rate_limit_error);
                }

                if let Some(auth_error) = Self::auth_error(&error) {
                    return Err(auth_error);
                }

                if Self::is_retryable(&error) {
                    return Err(ParentAiError::LlmTransient(error.to_string()));
                }

                Err(Self::map_openai_error(error))
            }
        }
    }

    // max_completion_tokens is not understood by most compatible servers
    #[allow(deprecated)]
    fn build_request(&self, request: &CompletionRequest) -> Result<CreateChatCompletionRequest> {
        let mut messages = Vec::new();

        if !request.system_prompt.trim().is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system_prompt.as_str())
                    .build()
                    .map_err(|error| {
                        ParentAiError::Validation(format!("Invalid system prompt: {error}"))
                    })?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user_message.as_str())
                .build()
                .map_err(|error| ParentAiError::Validation(format!("Invalid user message: {error}")))?
                .into(),
        );

        CreateChatCompletionRequestArgs::default()
            .model(self.config.model.clone())
            .messages(messages)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build()
            .map_err(|error| {
                ParentAiError::Validation(format!("Invalid LLM completion request: {error}"))
            })
    }

    fn extract_content(response: CreateChatCompletionResponse) -> Result<String> {
        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ParentAiError::Llm("LLM response contained no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(ParentAiError::Llm(
                "LLM response contained empty content".to_string(),
            ));
        }

        Ok(trimmed.to_string())
    }

    fn is_retryable(error: &OpenAIError) -> bool {
        match error {
            // server errors carry no type or code
            OpenAIError::ApiError(api_error) => {
                api_error.r#type.is_none() && api_error.code.is_none()
            }
            OpenAIError::Reqwest(reqwest_error) => reqwest_error
                .status()
                .map(|status| status.is_server_error())
                .unwrap_or(true),
            _ => false,
        }
    }

    fn rate_limit_error(error: &OpenAIError) -> Option<ParentAiError> {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) =>
            {
                Some(ParentAiError::LlmRateLimit { retry_after: None })
            }
            OpenAIError::ApiError(api_error) if Self::is_rate_limit_api_error(api_error) => {
                Some(ParentAiError::LlmRateLimit { retry_after: None })
            }
            _ => None,
        }
    }

    fn auth_error(error: &OpenAIError) -> Option<ParentAiError> {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::UNAUTHORIZED)
                    || reqwest_error.status() == Some(reqwest::StatusCode::FORBIDDEN) =>
            {
                Some(ParentAiError::ApiAuth(format!(
                    "LLM authentication failed: {reqwest_error}"
                )))
            }
            OpenAIError::ApiError(api_error) if Self::is_auth_api_error(api_error) => Some(
                ParentAiError::ApiAuth(format!("LLM authentication failed: {api_error}")),
            ),
            _ => None,
        }
    }

    fn is_rate_limit_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("rate limit")
            || message.contains("too many requests")
            || error_type.contains("rate_limit")
            || code.contains("rate_limit")
    }

    fn is_auth_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("unauthorized")
            || message.contains("forbidden")
            || message.contains("authentication")
            || message.contains("invalid api key")
            || message.contains("incorrect api key")
            || code.contains("invalid_api_key")
            || code.contains("authentication")
            || error_type.contains("authentication")
    }

    fn map_openai_error(error: OpenAIError) -> ParentAiError {
        match error {
            OpenAIError::Reqwest(reqwest_error) => {
                ParentAiError::Llm(format!("LLM request failed: {reqwest_error}"))
            }
            OpenAIError::ApiError(api_error) => {
                ParentAiError::Llm(format!("LLM API error: {api_error}"))
            }
            OpenAIError::JSONDeserialize(err) => {
                ParentAiError::Llm(format!("Failed to parse LLM response: {err}"))
            }
            OpenAIError::InvalidArgument(message) => ParentAiError::Validation(message),
            other => ParentAiError::Llm(other.to_string()),
        }
    }
}

impl ApiConfig {
    fn from_llm_config(config: &LlmConfig) -> Self {
        let (provider, model) = parse_llm_provider_model(&config.model);

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());

        let normalized_model = if provider.eq_ignore_ascii_case("local") {
            config.model.clone()
        } else {
            model.to_string()
        };

        Self {
            base_url,
            api_key: config.api_key.clone(),
            model: normalized_model,
            timeout_secs: config.timeout_secs,
        }
    }
}

fn default_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openai" => OPENAI_BASE_URL,
        "openrouter" => OPENROUTER_BASE_URL,
        "ollama" => OLLAMA_BASE_URL,
        "lmstudio" => "http://localhost:1234/v1",
        _ => OPENAI_BASE_URL,
    }
}
