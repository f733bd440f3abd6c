pub mod board;
pub mod sorting;
pub mod task;
pub mod time;

pub use board::{Board, BoardConfig, List, ListConfig, ListStats};
pub use sorting::{sort_tasks, SortField, SortOrder};
pub use task::{Attachment, ListId, Task, TaskId, TaskPatch};
pub use time::{Countdown, TimeEstimate};
