//! Countdown timer bound to a selected task

pub mod engine;
pub mod state;

pub use engine::TimerEngine;
pub use state::{TickOutcome, TimerState};
