//! Single-writer owner of the current board snapshot.
//!
//! [`BoardStore`] applies one command at a time to the current [`Board`] and
//! publishes each resulting snapshot on a `tokio::sync::watch` channel.
//! Readers (the timer engine, a presentation layer) hold receivers and never
//! see a half-applied change.

use crate::domain::board::{Board, BoardConfig, ListStats};
use crate::domain::task::{Attachment, ListId, Task, TaskId, TaskPatch};
use crate::domain::time::TimeEstimate;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Named mutation issued by a presentation layer.
///
/// A completed drag maps to one `MoveTask`, a submitted form to one
/// `CreateTask` or `UpdateTask`, and a confirmed delete to one `DeleteTask`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardCommand {
    CreateTask {
        list_id: ListId,
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        time_estimate: TimeEstimate,
        #[serde(default)]
        notes: String,
    },
    UpdateTask {
        task_id: TaskId,
        patch: TaskPatch,
    },
    DeleteTask {
        task_id: TaskId,
    },
    MoveTask {
        task_id: TaskId,
        target: ListId,
    },
    SetTaskStatus {
        task_id: TaskId,
        status: ListId,
    },
    AddAttachment {
        task_id: TaskId,
        attachment: Attachment,
    },
    RemoveAttachment {
        task_id: TaskId,
        attachment: Attachment,
    },
}

/// Result of a successfully dispatched command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Created(Task),
    Applied,
}

pub struct BoardStore {
    tx: watch::Sender<Arc<Board>>,
}

impl BoardStore {
    pub fn new(board: Board) -> Self {
        info!(
            board = board.name(),
            lists = board.lists().len(),
            "board store initialized"
        );
        let (tx, _rx) = watch::channel(Arc::new(board));
        Self { tx }
    }

    pub fn from_config(config: &BoardConfig) -> Result<Self> {
        Ok(Self::new(Board::new(config)?))
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<Board> {
        self.tx.borrow().clone()
    }

    /// Receiver notified once per published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<Board>> {
        self.tx.subscribe()
    }

    fn publish(&self, next: Board) {
        self.tx.send_replace(Arc::new(next));
    }

    pub fn create_task(
        &mut self,
        list_id: &ListId,
        title: impl Into<String>,
        description: impl Into<String>,
        time_estimate: TimeEstimate,
        notes: impl Into<String>,
    ) -> Result<Task> {
        let current = self.snapshot();
        let (next, task) = current
            .create_task(list_id, title, description, time_estimate, notes)
            .inspect_err(|e| warn!(list_id = %list_id, error = %e, "create rejected"))?;

        debug!(task_id = %task.id, list_id = %list_id, "task created");
        self.publish(next);
        Ok(task)
    }

    pub fn update_task(&mut self, task_id: &TaskId, patch: &TaskPatch) -> Result<()> {
        let current = self.snapshot();
        let next = current
            .update_task(task_id, patch)
            .inspect_err(|e| warn!(task_id = %task_id, error = %e, "update rejected"))?;

        debug!(task_id = %task_id, "task updated");
        self.publish(next);
        Ok(())
    }

    /// Idempotent: deleting an unknown task publishes nothing
    pub fn delete_task(&mut self, task_id: &TaskId) {
        let current = self.snapshot();
        if current.task(task_id).is_none() {
            debug!(task_id = %task_id, "delete ignored, task not on board");
            return;
        }

        debug!(task_id = %task_id, "task deleted");
        self.publish(current.delete_task(task_id));
    }

    pub fn move_task(&mut self, task_id: &TaskId, target: &ListId) {
        let current = self.snapshot();
        if current.task(task_id).is_none() || current.list(target).is_none() {
            debug!(task_id = %task_id, target_list = %target, "move ignored, unknown task or list");
            return;
        }

        debug!(task_id = %task_id, target_list = %target, "task moved");
        self.publish(current.move_task(task_id, target));
    }

    pub fn set_task_status(&mut self, task_id: &TaskId, status: &ListId) {
        let current = self.snapshot();
        if current.task(task_id).is_none() {
            debug!(task_id = %task_id, "status change ignored, task not on board");
            return;
        }

        debug!(task_id = %task_id, status = %status, "task status set");
        self.publish(current.set_task_status(task_id, status));
    }

    pub fn add_attachment(&mut self, task_id: &TaskId, attachment: Attachment) -> Result<()> {
        let current = self.snapshot();
        let next = current
            .add_attachment(task_id, attachment)
            .inspect_err(|e| warn!(task_id = %task_id, error = %e, "attach rejected"))?;

        self.publish(next);
        Ok(())
    }

    pub fn remove_attachment(&mut self, task_id: &TaskId, attachment: &Attachment) -> Result<()> {
        let current = self.snapshot();
        let next = current
            .remove_attachment(task_id, attachment)
            .inspect_err(|e| warn!(task_id = %task_id, error = %e, "detach rejected"))?;

        self.publish(next);
        Ok(())
    }

    pub fn list_stats(&self, list_id: &ListId) -> ListStats {
        self.tx.borrow().list_stats(list_id)
    }

    /// Applies a command. On error the published snapshot is unchanged.
    pub fn dispatch(&mut self, command: BoardCommand) -> Result<CommandOutcome> {
        match command {
            BoardCommand::CreateTask {
                list_id,
                title,
                description,
                time_estimate,
                notes,
            } => self
                .create_task(&list_id, title, description, time_estimate, notes)
                .map(CommandOutcome::Created),
            BoardCommand::UpdateTask { task_id, patch } => self
                .update_task(&task_id, &patch)
                .map(|()| CommandOutcome::Applied),
            BoardCommand::DeleteTask { task_id } => {
                self.delete_task(&task_id);
                Ok(CommandOutcome::Applied)
            }
            BoardCommand::MoveTask { task_id, target } => {
                self.move_task(&task_id, &target);
                Ok(CommandOutcome::Applied)
            }
            BoardCommand::SetTaskStatus { task_id, status } => {
                self.set_task_status(&task_id, &status);
                Ok(CommandOutcome::Applied)
            }
            BoardCommand::AddAttachment {
                task_id,
                attachment,
            } => self
                .add_attachment(&task_id, attachment)
                .map(|()| CommandOutcome::Applied),
            BoardCommand::RemoveAttachment {
                task_id,
                attachment,
            } => self
                .remove_attachment(&task_id, &attachment)
                .map(|()| CommandOutcome::Applied),
        }
    }
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new(Board::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::ListConfig;
    use crate::error::BoardError;

    fn store() -> BoardStore {
        let config = BoardConfig {
            name: "Store".to_string(),
            lists: vec![ListConfig::new("A", "A"), ListConfig::new("B", "B")],
        };
        BoardStore::from_config(&config).unwrap()
    }

    #[test]
    fn test_create_publishes_snapshot() {
        let mut store = store();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        let task = store
            .create_task(&ListId::from("A"), "T", "", TimeEstimate::new(1, 0), "")
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let board = rx.borrow_and_update().clone();
        assert_eq!(board.task(&task.id).unwrap().title, "T");
        assert_eq!(store.snapshot(), board);
    }

    #[test]
    fn test_failed_command_leaves_snapshot() {
        let mut store = store();
        let before = store.snapshot();
        let rx = store.subscribe();

        let err = store
            .update_task(&TaskId::from("missing"), &TaskPatch::new().title("x"))
            .unwrap_err();

        assert!(matches!(err, BoardError::TaskNotFound(_)));
        assert!(!rx.has_changed().unwrap());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn test_noop_commands_publish_nothing() {
        let mut store = store();
        let rx = store.subscribe();

        store.delete_task(&TaskId::from("ghost"));
        store.move_task(&TaskId::from("ghost"), &ListId::from("B"));
        store.set_task_status(&TaskId::from("ghost"), &ListId::from("B"));

        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_old_snapshot_is_not_aliased() {
        let mut store = store();
        let task = store
            .create_task(&ListId::from("A"), "T", "", TimeEstimate::ZERO, "")
            .unwrap();
        let before = store.snapshot();

        store.move_task(&task.id, &ListId::from("B"));

        assert_eq!(before.task(&task.id).unwrap().status, ListId::from("A"));
        assert_eq!(store.snapshot().task(&task.id).unwrap().status, ListId::from("B"));
    }

    #[test]
    fn test_dispatch_drag_and_form_commands() {
        let mut store = store();

        let outcome = store
            .dispatch(BoardCommand::CreateTask {
                list_id: ListId::from("A"),
                title: "Card".to_string(),
                description: String::new(),
                time_estimate: TimeEstimate::new(0, 40),
                notes: String::new(),
            })
            .unwrap();
        let CommandOutcome::Created(task) = outcome else {
            panic!("expected a created task");
        };

        store
            .dispatch(BoardCommand::MoveTask {
                task_id: task.id.clone(),
                target: ListId::from("B"),
            })
            .unwrap();
        store
            .dispatch(BoardCommand::UpdateTask {
                task_id: task.id.clone(),
                patch: TaskPatch::new().time_estimate(TimeEstimate::new(0, 50)),
            })
            .unwrap();

        let stats = store.list_stats(&ListId::from("B"));
        assert_eq!(stats.total, 1);
        assert_eq!(stats.total_time, TimeEstimate::new(0, 50));
        assert_eq!(store.list_stats(&ListId::from("A")).total, 0);

        store
            .dispatch(BoardCommand::DeleteTask {
                task_id: task.id.clone(),
            })
            .unwrap();
        assert!(store.snapshot().task(&task.id).is_none());
    }

    #[test]
    fn test_dispatch_create_unknown_list() {
        let mut store = store();
        let err = store
            .dispatch(BoardCommand::CreateTask {
                list_id: ListId::from("Z"),
                title: "x".to_string(),
                description: String::new(),
                time_estimate: TimeEstimate::ZERO,
                notes: String::new(),
            })
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.snapshot().task_count(), 0);
    }

    #[test]
    fn test_command_from_json() {
        let command: BoardCommand = serde_json::from_str(
            r#"{"type": "create_task", "list_id": "A", "title": "From UI",
                "time_estimate": {"hours": "1", "minutes": "abc"}}"#,
        )
        .unwrap();

        assert_eq!(
            command,
            BoardCommand::CreateTask {
                list_id: ListId::from("A"),
                title: "From UI".to_string(),
                description: String::new(),
                time_estimate: TimeEstimate::new(1, 0),
                notes: String::new(),
            }
        );

        let command: BoardCommand = serde_json::from_str(
            r#"{"type": "move_task", "task_id": "t1", "target": "B"}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            BoardCommand::MoveTask {
                task_id: TaskId::from("t1"),
                target: ListId::from("B"),
            }
        );
    }
}
