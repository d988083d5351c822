//! File-based feedback log — JSON-lines storage.
//!
//! Each line is one JSON-encoded `FeedbackRecord`. Records are loaded on
//! open and appended to the file on every write.
//!
//! Default location: `~/.parley/feedback.jsonl`

use async_trait::async_trait;
use parley_core::error::FeedbackError;
use parley_core::feedback::{FeedbackLog, FeedbackRecord};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub struct JsonlLog {
    path: PathBuf,
    records: Arc<RwLock<Vec<FeedbackRecord>>>,
}

impl JsonlLog {
    /// Open the log at `path`, loading any records already there.
    ///
    /// The file is created on first write.
    pub fn new(path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = records.len(), "Feedback log loaded");
        Self {
            path,
            records: Arc::new(RwLock::new(records)),
        }
    }

    fn load_from_disk(path: &Path) -> Vec<FeedbackRecord> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read feedback log");
                return Vec::new();
            }
        };

        bytes
            .split(|b| *b == b'\n')
            .enumerate()
            .filter_map(|(i, raw)| {
                let line = match std::str::from_utf8(raw) {
                    Ok(line) => line.trim(),
                    Err(e) => {
                        warn!(line = i + 1, error = %e, "Skipping non-UTF-8 feedback record");
                        return None;
                    }
                };
                if line.is_empty() {
                    return None;
                }
                match serde_json::from_str::<FeedbackRecord>(line) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(line = i + 1, error = %e, "Skipping corrupted feedback record");
                        None
                    }
                }
            })
            .collect()
    }

    fn append_to_disk(&self, records: &[FeedbackRecord]) -> Result<(), FeedbackError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FeedbackError::Storage(format!("Failed to create feedback directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for record in records {
            let line = serde_json::to_string(record)
                .map_err(|e| FeedbackError::Encoding(e.to_string()))?;
            content.push_str(&line);
            content.push('\n');
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| FeedbackError::Storage(format!("Failed to open feedback log: {e}")))?;
        file.write_all(content.as_bytes())
            .map_err(|e| FeedbackError::Storage(format!("Failed to write feedback log: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl FeedbackLog for JsonlLog {
    fn name(&self) -> &str {
        "file"
    }

    async fn add_completion(&self, records: Vec<FeedbackRecord>) -> Result<(), FeedbackError> {
        let mut guard = self.records.write().await;
        self.append_to_disk(&records)?;
        debug!(path = %self.path.display(), added = records.len(), "Feedback appended");
        guard.extend(records);
        Ok(())
    }

    async fn records(&self) -> Result<Vec<FeedbackRecord>, FeedbackError> {
        Ok(self.records.read().await.clone())
    }
}
