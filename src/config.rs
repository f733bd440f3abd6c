//! Board layout and timer settings, loaded from JSON

use crate::domain::board::BoardConfig;
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use tokio::fs;

/// Countdown timer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Milliseconds between scheduled ticks. Each tick removes one second.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl TimerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(BoardError::ConfigError(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskboardConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub timer: TimerConfig,
}

impl TaskboardConfig {
    /// Parses and validates a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).await?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), lists = config.board.lists.len(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.board.validate()?;
        self.timer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::ListConfig;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TaskboardConfig::default();
        assert_eq!(config.board.lists.len(), 3);
        assert_eq!(config.timer.tick_interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = TaskboardConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TaskboardConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = TaskboardConfig::from_json_str(
            r#"{
                "board": {
                    "lists": [
                        {"id": "backlog", "title": "Backlog"},
                        {"id": "shipped", "title": "Shipped"}
                    ]
                },
                "timer": {"tick_interval_ms": 250}
            }"#,
        )
        .unwrap();

        assert_eq!(config.board.name, "Task Board");
        assert_eq!(
            config.board.lists,
            vec![
                ListConfig::new("backlog", "Backlog"),
                ListConfig::new("shipped", "Shipped")
            ]
        );
        assert_eq!(config.timer.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_rejects_zero_tick_interval() {
        let err = TaskboardConfig::from_json_str(r#"{"timer": {"tick_interval_ms": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, BoardError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_duplicate_lists() {
        let err = TaskboardConfig::from_json_str(
            r#"{"board": {"lists": [{"id": "a", "title": "A"}, {"id": "a", "title": "B"}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, BoardError::DuplicateListId(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = TaskboardConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, BoardError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("taskboard.json");
        tokio::fs::write(&path, r#"{"board": {"name": "Sprint 12"}}"#)
            .await
            .unwrap();

        let config = TaskboardConfig::load(&path).await.unwrap();
        assert_eq!(config.board.name, "Sprint 12");
        assert_eq!(config.board.lists.len(), 3);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = TaskboardConfig::load(temp_dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::IoError(_)));
    }
}
