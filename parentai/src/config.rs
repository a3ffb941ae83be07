use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::error::{ParentAiError, Result};
use crate::models::AgeScheme;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

fn env_nonempty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embeddings: EmbeddingsConfig,
    pub processing: ProcessingConfig,
    pub retrieval: RetrievalConfig,
    pub knowledge: KnowledgeConfig,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Chat completion model used to generate answers
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    /// Total attempts per answer, including the first one.
    pub max_attempts: u32,
    /// First retry delay; doubles on every further attempt. Zero retries immediately.
    pub retry_base_delay_ms: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Reference document to retrieve passages from. Retrieval is disabled when unset.
    pub document_path: Option<PathBuf>,
    pub cache_path: PathBuf,
    pub max_chunks: usize,
    pub min_similarity: Option<f32>,
    pub query_cache_size: usize,
    /// Interval for re-checking the reference document fingerprint. Zero disables.
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    pub knowledge_path: Option<PathBuf>,
    pub topic_keywords_path: Option<PathBuf>,
    pub age_scheme: AgeScheme,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    pub name: String,
    /// Title of the reference work answers are grounded on, quoted in prompts.
    pub source_title: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "openai/gpt-3.5-turbo".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 30,
            max_attempts: 3,
            retry_base_delay_ms: 100,
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            document_path: None,
            cache_path: PathBuf::from("book_embeddings.json"),
            max_chunks: 3,
            min_similarity: None,
            query_cache_size: 256,
            refresh_interval_secs: 0,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "ParentAI".to_string(),
            source_title: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("PARENTAI_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PARENTAI_PORT", 3000),
            },
            llm: LlmConfig {
                model: env::var("LLM_MODEL")
                    .unwrap_or_else(|_| "openai/gpt-3.5-turbo".to_string()),
                api_key: env_nonempty("LLM_API_KEY").or_else(|| env_nonempty("OPENAI_API_KEY")),
                base_url: env_nonempty("LLM_BASE_URL"),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_attempts: parse_env_or("LLM_MAX_ATTEMPTS", 3),
                retry_base_delay_ms: parse_env_or("LLM_RETRY_BASE_DELAY_MS", 100),
                max_tokens: parse_env_or("LLM_MAX_TOKENS", 1000),
                temperature: parse_env_or("LLM_TEMPERATURE", 0.7),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "openai/text-embedding-3-small".to_string()),
                api_key: env_nonempty("EMBEDDING_API_KEY")
                    .or_else(|| env_nonempty("OPENAI_API_KEY")),
                base_url: env_nonempty("EMBEDDING_BASE_URL"),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", 30),
                max_retries: parse_env_or("EMBEDDING_MAX_RETRIES", 3),
                batch_size: parse_env_or("EMBEDDING_BATCH_SIZE", 64),
            },
            processing: ProcessingConfig {
                chunk_size: parse_env_or("CHUNK_SIZE", 1000),
                chunk_overlap: parse_env_or("CHUNK_OVERLAP", 200),
            },
            retrieval: RetrievalConfig {
                document_path: env_nonempty("REFERENCE_DOCUMENT").map(PathBuf::from),
                cache_path: env_nonempty("EMBEDDING_CACHE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("book_embeddings.json")),
                max_chunks: parse_env_or("RETRIEVAL_MAX_CHUNKS", 3),
                min_similarity: parse_env_opt("RETRIEVAL_MIN_SIMILARITY"),
                query_cache_size: parse_env_or("QUERY_EMBEDDING_CACHE_SIZE", 256),
                refresh_interval_secs: parse_env_or("CORPUS_REFRESH_INTERVAL_SECS", 0),
            },
            knowledge: KnowledgeConfig {
                knowledge_path: env_nonempty("KNOWLEDGE_PATH").map(PathBuf::from),
                topic_keywords_path: env_nonempty("TOPIC_KEYWORDS_PATH").map(PathBuf::from),
                age_scheme: parse_env_or("AGE_SCHEME", AgeScheme::Detailed),
            },
            assistant: AssistantConfig {
                name: env::var("ASSISTANT_NAME").unwrap_or_else(|_| "ParentAI".to_string()),
                source_title: env_nonempty("SOURCE_TITLE"),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Startup checks. A failure here must stop the host before it accepts traffic.
    pub fn validate(&self) -> Result<()> {
        let (provider, _) = parse_llm_provider_model(&self.llm.model);
        if provider_requires_api_key(provider) && self.llm.api_key.is_none() {
            return Err(ParentAiError::Config(format!(
                "LLM_API_KEY (or OPENAI_API_KEY) is required for model '{}'",
                self.llm.model
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ParentAiError::Config(
                "LLM_TIMEOUT must be at least 1 second".to_string(),
            ));
        }

        if self.llm.max_attempts == 0 {
            return Err(ParentAiError::Config(
                "LLM_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        if self.processing.chunk_size == 0 {
            return Err(ParentAiError::Config(
                "CHUNK_SIZE must be greater than zero".to_string(),
            ));
        }

        if self.processing.chunk_overlap >= self.processing.chunk_size {
            return Err(ParentAiError::Config(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.processing.chunk_overlap, self.processing.chunk_size
            )));
        }

        if let Some(document_path) = &self.retrieval.document_path {
            if !document_path.exists() {
                return Err(ParentAiError::Config(format!(
                    "REFERENCE_DOCUMENT not found: {}",
                    document_path.display()
                )));
            }

            let (provider, _) = parse_provider_model(&self.embeddings.model);
            if provider_requires_api_key(provider) && self.embeddings.api_key.is_none() {
                return Err(ParentAiError::Config(format!(
                    "EMBEDDING_API_KEY (or OPENAI_API_KEY) is required for model '{}'",
                    self.embeddings.model
                )));
            }
        }

        Ok(())
    }
}

/// Known embedding providers that use OpenAI-compatible APIs
const KNOWN_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio", "local"];

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

fn provider_requires_api_key(provider: &str) -> bool {
    !matches!(
        provider.to_lowercase().as_str(),
        "ollama" | "local" | "lmstudio"
    )
}

/// Parse a model name into (provider, model) tuple.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("local", model)
}

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_llm_env() {
        for var in [
            "LLM_MODEL",
            "LLM_API_KEY",
            "OPENAI_API_KEY",
            "LLM_MAX_ATTEMPTS",
            "LLM_TEMPERATURE",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_llm_config_defaults() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_llm_env();

        let config = Config::default();
        assert_eq!(config.llm.model, "openai/gpt-3.5-turbo");
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm.max_attempts, 3);
        assert_eq!(config.llm.max_tokens, 1000);
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_openai_api_key_fallback() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_llm_env();
        std::env::set_var("OPENAI_API_KEY", "sk-fallback");

        let config = Config::default();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-fallback"));

        std::env::set_var("LLM_API_KEY", "sk-primary");
        let config = Config::default();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-primary"));

        clear_llm_env();
    }

    #[test]
    fn test_invalid_value_falls_back_to_default() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::set_var("LLM_MAX_ATTEMPTS", "three");
        let config = Config::default();
        assert_eq!(config.llm.max_attempts, 3);
        std::env::remove_var("LLM_MAX_ATTEMPTS");
    }

    #[test]
    fn test_age_scheme_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::set_var("AGE_SCHEME", "coarse");
        let config = Config::default();
        assert_eq!(config.knowledge.age_scheme, AgeScheme::Coarse);
        std::env::remove_var("AGE_SCHEME");

        let config = Config::default();
        assert_eq!(config.knowledge.age_scheme, AgeScheme::Detailed);
    }

    #[test]
    fn test_validate_requires_api_key_for_hosted_provider() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_llm_env();

        let config = Config::default();
        let result = config.validate();
        assert!(matches!(result, Err(ParentAiError::Config(_))));
    }

    #[test]
    fn test_validate_accepts_local_provider_without_key() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_llm_env();

        let mut config = Config::default();
        config.llm.model = "ollama/llama3".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overlap_not_smaller_than_size() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        let mut config = Config::default();
        config.llm.model = "ollama/llama3".to_string();
        config.processing.chunk_size = 100;
        config.processing.chunk_overlap = 100;
        assert!(matches!(config.validate(), Err(ParentAiError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_missing_reference_document() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        let mut config = Config::default();
        config.llm.model = "ollama/llama3".to_string();
        config.retrieval.document_path = Some(PathBuf::from("/definitely/not/here.pdf"));
        assert!(matches!(config.validate(), Err(ParentAiError::Config(_))));
    }

    #[test]
    fn test_parse_provider_model() {
        assert_eq!(
            parse_provider_model("openai/text-embedding-3-small"),
            ("openai", "text-embedding-3-small")
        );
        assert_eq!(
            parse_provider_model("BAAI/bge-small-en-v1.5"),
            ("local", "BAAI/bge-small-en-v1.5")
        );
        assert_eq!(parse_llm_provider_model("ollama/llama3"), ("ollama", "llama3"));
        assert_eq!(
            parse_llm_provider_model("unknown/model"),
            ("local", "unknown/model")
        );
    }

    #[test]
    fn test_parse_env_or_valid_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::set_var("__TEST_PARSE_PORT", "8080");
        let result: u16 = parse_env_or("__TEST_PARSE_PORT", 3000);
        assert_eq!(result, 8080);
        std::env::remove_var("__TEST_PARSE_PORT");
    }
}
