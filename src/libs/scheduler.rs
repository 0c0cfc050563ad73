//! Periodic timers behind a small trait.
//!
//! The tracker needs two repeating timers (reporting and status refresh)
//! and must be able to cancel them. [`TokioScheduler`] runs them on the
//! tokio runtime; [`ManualScheduler`] fires them only when a test advances
//! its [`ManualClock`].
//!
//! A timer task is a closure producing a future. The tokio scheduler
//! spawns every produced future and does not wait for it before the next
//! period, so slow tasks may overlap.

use crate::libs::clock::{Clock, ManualClock, Millis};
use anyhow::Result;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Longest period a tokio timer accepts; longer ones are clamped.
const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Work run on every period of a timer.
pub type TimerTask = Box<dyn FnMut() -> BoxFuture<'static, ()> + Send>;

/// Identifies a scheduled timer for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

pub trait Scheduler: Send + Sync {
    /// Runs `task` every `period`, first after one full period.
    fn schedule_periodic(&self, period: Duration, task: TimerTask) -> TimerId;

    /// Stops a timer. Unknown or already cancelled ids are ignored.
    fn cancel(&self, id: TimerId);
}

/// Scheduler backed by `tokio::time::interval`.
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    timers: Mutex<HashMap<TimerId, JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Binds to the runtime of the calling task.
    pub fn current() -> Result<Self> {
        Ok(Self::new(Handle::try_current()?))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_periodic(&self, period: Duration, mut task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let period = period.clamp(Duration::from_millis(1), MAX_PERIOD);
        let runtime = self.runtime.clone();

        let handle = self.runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                runtime.spawn(task());
            }
        });

        self.timers.lock().insert(id, handle);
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Some(handle) = self.timers.lock().remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.timers.lock().drain() {
            handle.abort();
        }
    }
}

struct ManualTimer {
    id: TimerId,
    period: Millis,
    next_due: Millis,
    task: TimerTask,
}

/// Deterministic scheduler for tests.
///
/// Timers fire only inside [`ManualScheduler::advance`], which moves the
/// shared clock to each due time in order and awaits the task's future
/// before moving on.
pub struct ManualScheduler {
    clock: ManualClock,
    next_id: AtomicU64,
    timers: Mutex<Vec<ManualTimer>>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            next_id: AtomicU64::new(1),
            timers: Mutex::new(Vec::new()),
        }
    }

    /// Number of timers that are still scheduled.
    pub fn active_timers(&self) -> usize {
        self.timers.lock().len()
    }

    /// Moves time forward by `millis`, running every timer that comes due.
    pub async fn advance(&self, millis: Millis) {
        let target = self.clock.now_millis() + millis;
        loop {
            let due = {
                let timers = self.timers.lock();
                timers.iter().filter(|t| t.next_due <= target).min_by_key(|t| t.next_due).map(|t| (t.id, t.next_due))
            };
            let Some((id, due_at)) = due else { break };

            self.clock.set(due_at);
            let future = {
                let mut timers = self.timers.lock();
                timers.iter_mut().find(|t| t.id == id).map(|timer| {
                    timer.next_due += timer.period;
                    (timer.task)()
                })
            };
            if let Some(future) = future {
                future.await;
            }
        }
        self.clock.set(target);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_periodic(&self, period: Duration, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let period = (period.min(MAX_PERIOD).as_millis() as Millis).max(1);
        self.timers.lock().push(ManualTimer {
            id,
            period,
            next_due: self.clock.now_millis() + period,
            task,
        });
        id
    }

    fn cancel(&self, id: TimerId) {
        self.timers.lock().retain(|t| t.id != id);
    }
}
