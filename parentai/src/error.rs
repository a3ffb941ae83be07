use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParentAiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API rate limit exceeded, retry after {retry_after:?} seconds")]
    ApiRateLimit { retry_after: Option<u64> },

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM transient error: {0}")]
    LlmTransient(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("LLM request timed out after {0} seconds")]
    LlmTimeout(u64),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ParentAiError {
    /// Whether a remote call that failed with this error may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            ParentAiError::LlmTransient(_)
            | ParentAiError::LlmTimeout(_)
            | ParentAiError::LlmRateLimit { .. }
            | ParentAiError::ApiRateLimit { .. } => true,
            ParentAiError::Http(e) => e
                .status()
                .map(|status| status.is_server_error())
                .unwrap_or(true),
            _ => false,
        }
    }

    /// A short reason safe to show to an end user. Carries no internal detail.
    pub fn short_reason(&self) -> &'static str {
        match self {
            ParentAiError::LlmTimeout(_) => "the assistant took too long to respond",
            ParentAiError::LlmRateLimit { .. } | ParentAiError::ApiRateLimit { .. } => {
                "the assistant is receiving too many requests"
            }
            ParentAiError::LlmUnavailable(_) => "the assistant is not configured",
            ParentAiError::ApiAuth(_) => "the assistant could not authenticate",
            ParentAiError::Cancelled => "the request was cancelled",
            ParentAiError::LlmTransient(_) | ParentAiError::Http(_) => {
                "the assistant service is temporarily unavailable"
            }
            _ => "an unexpected error occurred",
        }
    }
}

pub type Result<T> = std::result::Result<T, ParentAiError>;
