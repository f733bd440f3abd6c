use crate::domain::task::TaskId;
use crate::domain::time::{Countdown, TimeEstimate};
use serde::{Deserialize, Serialize};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing bound, or already at zero
    Idle,
    /// One second removed, time remains
    Ticked,
    /// The countdown just reached zero and stopped
    Finished,
}

/// Countdown bound to at most one task.
///
/// `Idle` is `bound_task_id == None`. With a task bound the timer is either
/// running (`is_active`) or paused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining: Countdown,
    pub is_active: bool,
    pub bound_task_id: Option<TaskId>,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.bound_task_id.is_none()
    }

    /// Binds a task and its current estimate, or clears the binding.
    /// Always leaves the timer paused.
    pub fn bind(&mut self, task: Option<(TaskId, TimeEstimate)>) {
        match task {
            Some((id, estimate)) => {
                self.remaining = Countdown::from(estimate);
                self.bound_task_id = Some(id);
            }
            None => {
                self.remaining = Countdown::ZERO;
                self.bound_task_id = None;
            }
        }
        self.is_active = false;
    }

    /// Returns `true` if this call switched the timer on
    pub fn start(&mut self) -> bool {
        if self.is_idle() || self.is_active {
            return false;
        }
        self.is_active = true;
        true
    }

    pub fn pause(&mut self) {
        self.is_active = false;
    }

    /// Restores the full estimate and pauses. Ignored while idle.
    pub fn reset_to(&mut self, estimate: TimeEstimate) {
        if self.is_idle() {
            return;
        }
        self.remaining = Countdown::from(estimate);
        self.is_active = false;
    }

    /// Advances the countdown by one second.
    ///
    /// Reaching zero switches the timer off; ticks at zero are no-ops that
    /// also switch it off.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_active || self.is_idle() {
            return TickOutcome::Idle;
        }

        if !self.remaining.tick_down() {
            self.is_active = false;
            return TickOutcome::Idle;
        }

        if self.remaining.is_zero() {
            self.is_active = false;
            TickOutcome::Finished
        } else {
            TickOutcome::Ticked
        }
    }
}
