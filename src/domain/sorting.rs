use crate::domain::task::Task;
use std::str::FromStr;

/// Fields available for sorting tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Estimate,
    Created,
    Updated,
    Attachments,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "estimate" => Ok(SortField::Estimate),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            "attachments" => Ok(SortField::Attachments),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: title, estimate, created, updated, attachments",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts tasks in place by `field`.
///
/// The sort is stable, so tasks that compare equal keep their list order.
/// This is a view helper: board lists are never reordered by it.
///
/// # Examples
/// ```
/// use taskboard_core::domain::sorting::{sort_tasks, SortField, SortOrder};
/// use taskboard_core::domain::task::{ListId, Task, TaskId};
///
/// let mut tasks = vec![
///     Task::new(TaskId::from("1"), "b".to_string(), ListId::from("todo")),
///     Task::new(TaskId::from("2"), "A".to_string(), ListId::from("todo")),
/// ];
///
/// sort_tasks(&mut tasks, SortField::Title, SortOrder::Ascending);
/// assert_eq!(tasks[0].title, "A");
/// ```
pub fn sort_tasks(tasks: &mut [Task], field: SortField, order: SortOrder) {
    tasks.sort_by(|a, b| {
        let cmp = match field {
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Estimate => a
                .time_estimate
                .total_minutes()
                .cmp(&b.time_estimate.total_minutes()),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
            SortField::Attachments => a.attachments.len().cmp(&b.attachments.len()),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::{Attachment, ListId, TaskId};
    use crate::domain::time::TimeEstimate;

    fn task(id: &str, title: &str, hours: u32, minutes: u32) -> Task {
        Task::new(TaskId::from(id), title.to_string(), ListId::from("todo"))
            .with_time_estimate(TimeEstimate::new(hours, minutes))
    }

    #[test]
    fn test_sort_by_title_case_insensitive() {
        let mut tasks = vec![
            task("1", "charlie", 0, 0),
            task("2", "Alpha", 0, 0),
            task("3", "bravo", 0, 0),
        ];

        sort_tasks(&mut tasks, SortField::Title, SortOrder::Ascending);

        assert_eq!(tasks[0].title, "Alpha");
        assert_eq!(tasks[1].title, "bravo");
        assert_eq!(tasks[2].title, "charlie");
    }

    #[test]
    fn test_sort_by_estimate_descending() {
        let mut tasks = vec![
            task("1", "a", 0, 30),
            task("2", "b", 2, 0),
            task("3", "c", 0, 90),
        ];

        sort_tasks(&mut tasks, SortField::Estimate, SortOrder::Descending);

        assert_eq!(tasks[0].id.as_str(), "2");
        assert_eq!(tasks[1].id.as_str(), "3");
        assert_eq!(tasks[2].id.as_str(), "1");
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut tasks = vec![
            task("1", "same", 1, 0),
            task("2", "same", 1, 0),
            task("3", "same", 1, 0),
        ];

        sort_tasks(&mut tasks, SortField::Estimate, SortOrder::Ascending);

        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_sort_by_created() {
        let first = task("1", "first", 0, 0);
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = task("2", "second", 0, 0);
        let mut tasks = vec![second, first];

        sort_tasks(&mut tasks, SortField::Created, SortOrder::Ascending);

        assert_eq!(tasks[0].id.as_str(), "1");
    }

    #[test]
    fn test_sort_by_attachment_count() {
        let mut busy = task("1", "busy", 0, 0);
        busy.add_attachment(Attachment::new("a"));
        busy.add_attachment(Attachment::new("b"));
        let mut tasks = vec![busy, task("2", "idle", 0, 0)];

        sort_tasks(&mut tasks, SortField::Attachments, SortOrder::Ascending);

        assert_eq!(tasks[0].id.as_str(), "2");
    }

    #[test]
    fn test_parse_sort_field() {
        assert_eq!(SortField::from_str("TITLE").unwrap(), SortField::Title);
        assert_eq!(SortField::from_str("estimate").unwrap(), SortField::Estimate);
        assert!(SortField::from_str("status").is_err());
    }

    #[test]
    fn test_parse_sort_order() {
        assert_eq!(SortOrder::from_str("asc").unwrap(), SortOrder::Ascending);
        assert_eq!(SortOrder::from_str("DESC").unwrap(), SortOrder::Descending);
        assert!(SortOrder::from_str("up").is_err());
    }
}
