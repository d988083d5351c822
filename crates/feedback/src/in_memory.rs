//! In-memory log — useful for testing and sessions where nothing should
//! outlive the process.

use async_trait::async_trait;
use parley_core::error::FeedbackError;
use parley_core::feedback::{FeedbackLog, FeedbackRecord};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct InMemoryLog {
    records: Arc<RwLock<Vec<FeedbackRecord>>>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedbackLog for InMemoryLog {
    fn name(&self) -> &str { "memory" }

    async fn add_completion(&self, records: Vec<FeedbackRecord>) -> Result<(), FeedbackError> {
        self.records.write().await.extend(records);
        Ok(())
    }

    async fn records(&self) -> Result<Vec<FeedbackRecord>, FeedbackError> {
        Ok(self.records.read().await.clone())
    }
}
