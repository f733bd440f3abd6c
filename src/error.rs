use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid task ID: {0:?}")]
    InvalidTaskId(String),

    #[error("Attachment {attachment} not found on task {task}")]
    AttachmentNotFound { task: String, attachment: String },

    #[error("Duplicate list ID: {0}")]
    DuplicateListId(String),

    #[error("Invalid list ID: {0:?}")]
    InvalidListId(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BoardError {
    /// True for errors caused by a list, task or attachment reference that
    /// does not resolve against the current board.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ListNotFound(_) | Self::TaskNotFound(_) | Self::AttachmentNotFound { .. }
        )
    }
}
