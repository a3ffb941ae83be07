mod api;
mod generator;
pub mod prompts;
mod provider;

pub use api::LlmApiClient;
pub use generator::{GeneratorSettings, Generated, ResponseGenerator};
pub use prompts::{KnowledgeContext, PromptAssembler, PromptContext};
pub use provider::{CompletionClient, CompletionRequest, LlmBackend, LlmProvider};
