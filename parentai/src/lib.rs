pub mod api;
pub mod classify;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod models;
pub mod retrieval;
pub mod services;
pub mod session;
