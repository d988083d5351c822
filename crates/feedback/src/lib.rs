//! Feedback log implementations for Parley.

pub mod file_log;
pub mod in_memory;

pub use file_log::JsonlLog;
pub use in_memory::InMemoryLog;

use std::sync::Arc;

use parley_core::feedback::FeedbackLog;

/// Build the feedback log selected by `config.feedback.backend`.
pub fn build_from_config(config: &parley_config::AppConfig) -> Arc<dyn FeedbackLog> {
    match config.feedback.backend.as_str() {
        "memory" => Arc::new(InMemoryLog::new()),
        _ => Arc::new(JsonlLog::new(config.feedback_path())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_follows_config() {
        let mut config = parley_config::AppConfig::default();
        config.feedback.backend = "memory".into();
        assert_eq!(build_from_config(&config).name(), "memory");

        let dir = tempfile::tempdir().unwrap();
        config.feedback.backend = "file".into();
        config.feedback.path = Some(dir.path().join("log.jsonl").display().to_string());
        assert_eq!(build_from_config(&config).name(), "file");
    }
}
