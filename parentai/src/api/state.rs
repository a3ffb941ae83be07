use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::services::ParentingAssistant;

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<ParentingAssistant>,
    /// Cancelled on shutdown; in-flight answers stop retrying.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(assistant: ParentingAssistant, shutdown: CancellationToken) -> Self {
        Self {
            assistant: Arc::new(assistant),
            shutdown,
        }
    }
}
