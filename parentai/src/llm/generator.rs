use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::LlmConfig;
use crate::error::{ParentAiError, Result};
use crate::llm::prompts::PromptAssembler;
use crate::llm::provider::{CompletionClient, CompletionRequest};
use crate::models::AgeBand;

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GeneratorSettings {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            timeout: Duration::from_secs(config.timeout_secs),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` is 1-based.
    fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

/// Outcome of [`ResponseGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    Completion(String),
    /// The error response, served after the attempt budget ran out or a
    /// non-transient failure.
    Fallback(String),
}

impl Generated {
    pub fn text(&self) -> &str {
        match self {
            Generated::Completion(text) | Generated::Fallback(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Generated::Completion(text) | Generated::Fallback(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generated::Fallback(_))
    }
}

/// Drives the completion service with bounded retries.
pub struct ResponseGenerator {
    client: Arc<dyn CompletionClient>,
    settings: GeneratorSettings,
    assembler: PromptAssembler,
}

impl ResponseGenerator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        settings: GeneratorSettings,
        assembler: PromptAssembler,
    ) -> Self {
        Self {
            client,
            settings,
            assembler,
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Completion failures become the error response text. Only cancellation
    /// is returned as an error.
    pub async fn generate(
        &self,
        prompt: &str,
        question: &str,
        band: AgeBand,
        cancel: &CancellationToken,
    ) -> Result<Generated> {
        match self.complete_with_retry(prompt, question, cancel).await {
            Ok(text) => Ok(Generated::Completion(text)),
            Err(ParentAiError::Cancelled) => Err(ParentAiError::Cancelled),
            Err(error) => {
                tracing::warn!(error = %error, "Completion failed, serving error response");
                Ok(Generated::Fallback(self.assembler.error_response(
                    question,
                    band,
                    error.short_reason(),
                )))
            }
        }
    }

    /// Returns the last error once the attempt budget is spent.
    pub async fn complete_with_retry(
        &self,
        prompt: &str,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let request = CompletionRequest {
            system_prompt: prompt.to_string(),
            user_message: question.to_string(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ParentAiError::Cancelled),
                result = tokio::time::timeout(self.settings.timeout, self.client.complete(&request)) => {
                    match result {
                        Ok(inner) => inner,
                        Err(_) => Err(ParentAiError::LlmTimeout(self.settings.timeout.as_secs())),
                    }
                }
            };

            let error = match result {
                Ok(text) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "Completion succeeded after retry");
                    }
                    return Ok(text);
                }
                Err(error) => error,
            };

            if !error.is_transient() || attempt >= max_attempts {
                return Err(error);
            }

            let delay = self.settings.delay_after(attempt);
            tracing::warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Transient completion failure, retrying"
            );

            if !delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ParentAiError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}
