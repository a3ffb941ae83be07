//! Per-caller profile and transcript storage.

mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ConversationRecord, UserProfile};

pub use memory::InMemorySessionStore;

/// Storage for caller profiles. Every method is keyed by an opaque caller id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
    /// Returns the stored profile, creating an empty one first if needed.
    async fn ensure_profile(&self, user_id: &str) -> Result<UserProfile>;
    async fn set_child_age(&self, user_id: &str, age_months: Option<u32>) -> Result<UserProfile>;
    async fn set_context(&self, user_id: &str, context: &str) -> Result<UserProfile>;
    async fn set_display_name(&self, user_id: &str, name: Option<String>) -> Result<UserProfile>;
    async fn record_exchange(&self, user_id: &str, record: ConversationRecord) -> Result<()>;
    /// Newest `limit` exchanges, oldest first. Unknown callers have no history.
    async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationRecord>>;
    /// Returns how many exchanges were removed.
    async fn clear_history(&self, user_id: &str) -> Result<usize>;
}
