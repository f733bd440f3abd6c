use crate::domain::sorting::{sort_tasks, SortField, SortOrder};
use crate::domain::task::{Attachment, ListId, Task, TaskId, TaskPatch};
use crate::domain::time::TimeEstimate;
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration for a single list (column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    pub id: ListId,
    pub title: String,
}

impl ListConfig {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: ListId::new(id),
            title: title.into(),
        }
    }
}

/// Board configuration. The list set is fixed once a board is built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_board_name")]
    pub name: String,
    #[serde(default = "default_lists")]
    pub lists: Vec<ListConfig>,
}

fn default_board_name() -> String {
    "Task Board".to_string()
}

fn default_lists() -> Vec<ListConfig> {
    vec![
        ListConfig::new("todo", "To Do"),
        ListConfig::new("in-progress", "In Progress"),
        ListConfig::new("done", "Done"),
    ]
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: default_board_name(),
            lists: default_lists(),
        }
    }
}

impl BoardConfig {
    /// Rejects blank and duplicate list IDs
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for list in &self.lists {
            if list.id.as_str().trim().is_empty() {
                return Err(BoardError::InvalidListId(list.id.to_string()));
            }
            if !seen.insert(&list.id) {
                return Err(BoardError::DuplicateListId(list.id.to_string()));
            }
        }
        Ok(())
    }
}

/// A column of tasks, in insertion order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub id: ListId,
    pub title: String,
    pub tasks: Vec<Task>,
}

impl List {
    fn from_config(config: &ListConfig) -> Self {
        Self {
            id: config.id.clone(),
            title: config.title.clone(),
            tasks: Vec::new(),
        }
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.tasks.iter().any(|t| &t.id == task_id)
    }

    /// Aggregates over the current tasks; never cached
    pub fn stats(&self) -> ListStats {
        ListStats {
            total: self.tasks.len(),
            total_time: self.tasks.iter().map(|t| t.time_estimate).sum(),
        }
    }
}

/// Derived per-list aggregates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStats {
    pub total: usize,
    pub total_time: TimeEstimate,
}

/// Immutable snapshot of every list and task.
///
/// Operations never mutate a board in place: each one returns the next
/// snapshot and leaves `self` untouched, so a rejected operation cannot leave
/// a partial change behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    name: String,
    lists: Vec<List>,
}

impl Board {
    pub fn new(config: &BoardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: config.name.clone(),
            lists: config.lists.iter().map(List::from_config).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    pub fn list(&self, list_id: &ListId) -> Option<&List> {
        self.lists.iter().find(|l| &l.id == list_id)
    }

    /// Finds a task anywhere on the board
    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.locate(task_id)
            .map(|(list, pos)| &self.lists[list].tasks[pos])
    }

    /// Returns the list whose sequence currently holds the task. This can
    /// differ from the task's `status` after [`Board::set_task_status`].
    pub fn list_of_task(&self, task_id: &TaskId) -> Option<&List> {
        self.locate(task_id).map(|(list, _)| &self.lists[list])
    }

    pub fn task_count(&self) -> usize {
        self.lists.iter().map(|l| l.tasks.len()).sum()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.lists.iter().flat_map(|l| l.tasks.iter())
    }

    fn list_index(&self, list_id: &ListId) -> Option<usize> {
        self.lists.iter().position(|l| &l.id == list_id)
    }

    fn locate(&self, task_id: &TaskId) -> Option<(usize, usize)> {
        self.lists.iter().enumerate().find_map(|(list, l)| {
            l.tasks
                .iter()
                .position(|t| &t.id == task_id)
                .map(|pos| (list, pos))
        })
    }

    /// Appends a new task to the end of `list_id`
    pub fn create_task(
        &self,
        list_id: &ListId,
        title: impl Into<String>,
        description: impl Into<String>,
        time_estimate: TimeEstimate,
        notes: impl Into<String>,
    ) -> Result<(Board, Task)> {
        let index = self
            .list_index(list_id)
            .ok_or_else(|| BoardError::ListNotFound(list_id.to_string()))?;

        let task = Task::new(TaskId::generate(), title.into(), list_id.clone())
            .with_description(description)
            .with_time_estimate(time_estimate)
            .with_notes(notes);

        let mut next = self.clone();
        next.lists[index].tasks.push(task.clone());
        Ok((next, task))
    }

    /// Merges `patch` onto the task. Membership and status are unchanged.
    pub fn update_task(&self, task_id: &TaskId, patch: &TaskPatch) -> Result<Board> {
        let (list, pos) = self
            .locate(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;

        let mut next = self.clone();
        next.lists[list].tasks[pos].apply_patch(patch);
        Ok(next)
    }

    /// Removes the task. Unknown IDs yield an identical board.
    pub fn delete_task(&self, task_id: &TaskId) -> Board {
        let mut next = self.clone();
        if let Some((list, pos)) = self.locate(task_id) {
            next.lists[list].tasks.remove(pos);
        }
        next
    }

    /// Moves the task to the end of `target`, updating its status.
    ///
    /// Moving onto the list that already holds the task still re-appends it
    /// as the last element. An unknown task or target yields an identical
    /// board.
    pub fn move_task(&self, task_id: &TaskId, target: &ListId) -> Board {
        let (Some((list, pos)), Some(target_index)) =
            (self.locate(task_id), self.list_index(target))
        else {
            return self.clone();
        };

        let mut next = self.clone();
        let mut task = next.lists[list].tasks.remove(pos);
        task.set_status(target.clone());
        next.lists[target_index].tasks.push(task);
        next
    }

    /// Updates only the status field; the task stays in its current list
    pub fn set_task_status(&self, task_id: &TaskId, status: &ListId) -> Board {
        let mut next = self.clone();
        if let Some((list, pos)) = self.locate(task_id) {
            next.lists[list].tasks[pos].set_status(status.clone());
        }
        next
    }

    pub fn add_attachment(&self, task_id: &TaskId, attachment: Attachment) -> Result<Board> {
        let (list, pos) = self
            .locate(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;

        let mut next = self.clone();
        next.lists[list].tasks[pos].add_attachment(attachment);
        Ok(next)
    }

    pub fn remove_attachment(&self, task_id: &TaskId, attachment: &Attachment) -> Result<Board> {
        let (list, pos) = self
            .locate(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;

        let mut next = self.clone();
        if !next.lists[list].tasks[pos].remove_attachment(attachment) {
            return Err(BoardError::AttachmentNotFound {
                task: task_id.to_string(),
                attachment: attachment.to_string(),
            });
        }
        Ok(next)
    }

    /// Count and summed estimate of a list; zero for an unknown list
    pub fn list_stats(&self, list_id: &ListId) -> ListStats {
        self.list(list_id).map(List::stats).unwrap_or_default()
    }

    /// Stats for every list, in board order
    pub fn all_list_stats(&self) -> Vec<(ListId, ListStats)> {
        self.lists
            .iter()
            .map(|l| (l.id.clone(), l.stats()))
            .collect()
    }

    /// Tasks whose title, description or notes contain `query`
    /// (case-insensitive), in board order
    pub fn search_tasks(&self, query: &str) -> Vec<&Task> {
        let query_lower = query.to_lowercase();
        self.tasks().filter(|t| t.matches(&query_lower)).collect()
    }

    /// Sorted copy of a list's tasks. The board itself keeps insertion order.
    pub fn sorted_tasks(&self, list_id: &ListId, field: SortField, order: SortOrder) -> Vec<Task> {
        let mut tasks = self
            .list(list_id)
            .map(|l| l.tasks.clone())
            .unwrap_or_default();
        sort_tasks(&mut tasks, field, order);
        tasks
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            name: default_board_name(),
            lists: default_lists().iter().map(List::from_config).collect(),
        }
    }
}
