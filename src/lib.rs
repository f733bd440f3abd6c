//! # Taskboard Core
//!
//! Board state machine and countdown timer for a single-page kanban task
//! board.
//!
//! The crate has no UI and no persistence. A presentation layer drives a
//! [`BoardStore`] with commands (create, edit, delete, move, status toggle),
//! reads immutable [`Board`] snapshots from it, and binds a [`TimerEngine`]
//! to the selected task to count its estimate down one second at a time.

pub mod config;
pub mod domain;
pub mod error;
pub mod store;
pub mod timer;

// Re-export commonly used types
pub use config::{TaskboardConfig, TimerConfig};
pub use domain::{
    board::{Board, BoardConfig, List, ListConfig, ListStats},
    task::{Attachment, ListId, Task, TaskId, TaskPatch},
    time::{Countdown, TimeEstimate},
};
pub use error::{BoardError, Result};
pub use store::{BoardCommand, BoardStore, CommandOutcome};
pub use timer::{TickOutcome, TimerEngine, TimerState};
