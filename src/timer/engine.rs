use crate::config::TimerConfig;
use crate::domain::board::Board;
use crate::domain::task::TaskId;
use crate::domain::time::TimeEstimate;
use crate::error::Result;
use crate::timer::state::{TickOutcome, TimerState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

struct Inner {
    state: TimerState,
    /// Estimate the countdown was last derived from
    bound_estimate: Option<TimeEstimate>,
    board: watch::Receiver<Arc<Board>>,
    updates: watch::Sender<TimerState>,
    ticker: Option<JoinHandle<()>>,
    /// Follows board snapshots so a paused or idle timer still reacts to edits
    watcher: Option<JoinHandle<()>>,
    shut_down: bool,
    /// Bumped whenever the ticker is cancelled; a tick carrying an older
    /// generation is discarded.
    generation: u64,
    tick_interval: Duration,
}

impl Inner {
    fn lookup(&self, task_id: &TaskId) -> Option<TimeEstimate> {
        self.board.borrow().task(task_id).map(|t| t.time_estimate)
    }

    fn rebind(&mut self, task: Option<(TaskId, TimeEstimate)>) {
        self.bound_estimate = task.as_ref().map(|(_, estimate)| *estimate);
        self.state.bind(task);
    }

    /// Reconciles the binding with the latest board snapshot
    fn sync(&mut self) {
        let Some(task_id) = self.state.bound_task_id.clone() else {
            return;
        };

        match self.lookup(&task_id) {
            None => {
                debug!(task_id = %task_id, "bound task no longer on board, unbinding");
                self.cancel_ticker();
                self.rebind(None);
            }
            Some(estimate) if Some(estimate) != self.bound_estimate => {
                debug!(task_id = %task_id, %estimate, "bound task estimate changed, rebinding");
                self.cancel_ticker();
                self.rebind(Some((task_id, estimate)));
            }
            Some(_) => {}
        }
    }

    fn cancel_ticker(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    /// Stops the ticker and the board watcher for good
    fn halt(&mut self) {
        self.shut_down = true;
        self.cancel_ticker();
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }

    fn publish(&self) {
        let current = self.state.clone();
        self.updates.send_if_modified(|published| {
            if *published == current {
                false
            } else {
                *published = current;
                true
            }
        });
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Countdown timer driven by a tokio interval and bound to the live board.
///
/// Each published board snapshot, every call and every scheduled tick
/// reconcile the binding: a bound task that has been deleted drops the engine
/// back to idle, and a bound task whose estimate was edited is rebound
/// (remaining reset, paused). The scheduled tick is cancelled on rebind,
/// pause, reset, shutdown and drop; the board watcher on shutdown and drop.
pub struct TimerEngine {
    inner: Arc<Mutex<Inner>>,
}

impl TimerEngine {
    /// Builds an engine reading from `board`.
    ///
    /// Inside a tokio runtime a watcher task is spawned that reconciles the
    /// timer as soon as a new snapshot is published. Without a runtime the
    /// engine only reconciles when it is called.
    pub fn new(board: watch::Receiver<Arc<Board>>, config: &TimerConfig) -> Result<Self> {
        config.validate()?;

        let (updates, _rx) = watch::channel(TimerState::new());
        let watched = board.clone();
        let inner = Arc::new(Mutex::new(Inner {
            state: TimerState::new(),
            bound_estimate: None,
            board,
            updates,
            ticker: None,
            watcher: None,
            shut_down: false,
            generation: 0,
            tick_interval: config.tick_interval(),
        }));

        match Handle::try_current() {
            Ok(handle) => {
                let watcher = handle.spawn(watch_board(Arc::downgrade(&inner), watched));
                lock(&inner).watcher = Some(watcher);
            }
            Err(_) => debug!("no tokio runtime, board changes are picked up on the next call"),
        }

        info!(tick_interval_ms = config.tick_interval_ms, "timer engine created");
        Ok(Self { inner })
    }

    /// Selects the task to count down, or clears the selection.
    ///
    /// An ID that is not on the board is treated like `None`.
    pub fn bind_task(&self, task_id: Option<&TaskId>) {
        let mut inner = lock(&self.inner);
        inner.cancel_ticker();

        let resolved = task_id.and_then(|id| inner.lookup(id).map(|estimate| (id.clone(), estimate)));
        if let (Some(id), None) = (task_id, &resolved) {
            debug!(task_id = %id, "cannot bind, task not on board");
        }

        inner.rebind(resolved);
        debug!(task_id = ?inner.state.bound_task_id, remaining = %inner.state.remaining, "timer bound");
        inner.publish();
    }

    /// Starts counting down. No-op while idle, already running or after
    /// [`TimerEngine::shutdown`].
    ///
    /// Outside a tokio runtime the timer is marked active but nothing is
    /// scheduled; the caller must drive [`TimerEngine::tick`] itself.
    pub fn start(&self) {
        let mut inner = lock(&self.inner);
        if inner.shut_down {
            debug!("start ignored, timer engine is shut down");
            return;
        }
        inner.sync();

        if inner.state.start() {
            inner.cancel_ticker();
            match Handle::try_current() {
                Ok(handle) => {
                    let ticker = run_ticker(
                        Arc::downgrade(&self.inner),
                        inner.generation,
                        inner.tick_interval,
                    );
                    inner.ticker = Some(handle.spawn(ticker));
                    debug!(task_id = ?inner.state.bound_task_id, "timer started");
                }
                Err(_) => warn!("no tokio runtime, timer started without a scheduled tick"),
            }
        }
        inner.publish();
    }

    pub fn pause(&self) {
        let mut inner = lock(&self.inner);
        inner.cancel_ticker();
        inner.sync();
        inner.state.pause();
        inner.publish();
    }

    /// Restores the countdown from the bound task's current estimate
    pub fn reset(&self) {
        let mut inner = lock(&self.inner);
        inner.cancel_ticker();
        inner.sync();

        if let Some(task_id) = inner.state.bound_task_id.clone() {
            if let Some(estimate) = inner.lookup(&task_id) {
                inner.bound_estimate = Some(estimate);
                inner.state.reset_to(estimate);
            }
        }
        inner.publish();
    }

    /// Advances one second by hand. Do not combine with a scheduled tick.
    pub fn tick(&self) -> TickOutcome {
        let mut inner = lock(&self.inner);
        inner.sync();
        let outcome = inner.state.tick();
        inner.publish();
        outcome
    }

    /// Current state, reconciled with the latest board
    pub fn state(&self) -> TimerState {
        let mut inner = lock(&self.inner);
        inner.sync();
        inner.publish();
        inner.state.clone()
    }

    /// Receiver notified whenever the timer state changes
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        lock(&self.inner).updates.subscribe()
    }

    /// Whether a scheduled tick is pending
    pub fn is_ticking(&self) -> bool {
        lock(&self.inner)
            .ticker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancels the scheduled tick and the board watcher, and pauses
    pub fn shutdown(&self) {
        let mut inner = lock(&self.inner);
        inner.halt();
        inner.state.pause();
        inner.publish();
        debug!("timer engine shut down");
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        lock(&self.inner).halt();
    }
}

async fn watch_board(inner: Weak<Mutex<Inner>>, mut board: watch::Receiver<Arc<Board>>) {
    while board.changed().await.is_ok() {
        let Some(strong) = inner.upgrade() else {
            break;
        };
        let mut guard = lock(&strong);
        if guard.shut_down {
            break;
        }
        guard.sync();
        guard.publish();
    }
}

async fn run_ticker(inner: Weak<Mutex<Inner>>, generation: u64, period: Duration) {
    let mut interval = time::interval_at(Instant::now() + period, period);

    loop {
        interval.tick().await;

        let Some(strong) = inner.upgrade() else {
            break;
        };
        let mut guard = lock(&strong);
        if guard.generation != generation {
            break;
        }

        guard.sync();
        if guard.generation != generation {
            guard.publish();
            break;
        }

        let outcome = guard.state.tick();
        guard.publish();
        match outcome {
            TickOutcome::Ticked => {}
            TickOutcome::Finished => {
                info!(task_id = ?guard.state.bound_task_id, "countdown finished");
                guard.ticker = None;
                break;
            }
            TickOutcome::Idle => {
                guard.ticker = None;
                break;
            }
        }
    }
}
