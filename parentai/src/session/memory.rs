use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SessionStore;
use crate::error::Result;
use crate::models::{ConversationRecord, UserProfile};

#[derive(Default)]
pub struct InMemorySessionStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    async fn update<F>(&self, user_id: &str, apply: F) -> Result<UserProfile>
    where
        F: FnOnce(&mut UserProfile) + Send,
    {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id));
        apply(profile);
        profile.touch();
        Ok(profile.clone())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn ensure_profile(&self, user_id: &str) -> Result<UserProfile> {
        if let Some(profile) = self.profiles.read().await.get(user_id) {
            return Ok(profile.clone());
        }

        let mut profiles = self.profiles.write().await;
        let profile = profiles.entry(user_id.to_string()).or_insert_with(|| {
            tracing::debug!(user_id, "Registered new caller");
            UserProfile::new(user_id)
        });
        Ok(profile.clone())
    }

    async fn set_child_age(&self, user_id: &str, age_months: Option<u32>) -> Result<UserProfile> {
        self.update(user_id, |profile| profile.child_age_months = age_months)
            .await
    }

    async fn set_context(&self, user_id: &str, context: &str) -> Result<UserProfile> {
        let context = context.trim().to_string();
        self.update(user_id, move |profile| profile.context = context)
            .await
    }

    async fn set_display_name(&self, user_id: &str, name: Option<String>) -> Result<UserProfile> {
        self.update(user_id, move |profile| profile.display_name = name)
            .await
    }

    async fn record_exchange(&self, user_id: &str, record: ConversationRecord) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id))
            .record(record);
        Ok(())
    }

    async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationRecord>> {
        Ok(self
            .profiles
            .read()
            .await
            .get(user_id)
            .map(|profile| profile.recent_history(limit).to_vec())
            .unwrap_or_default())
    }

    async fn clear_history(&self, user_id: &str) -> Result<usize> {
        let mut profiles = self.profiles.write().await;
        let Some(profile) = profiles.get_mut(user_id) else {
            return Ok(0);
        };
        let removed = profile.history.len();
        profile.history.clear();
        profile.touch();
        Ok(removed)
    }
}
