//! The activity heartbeat tracker.
//!
//! A tracker watches activity signals for one challenge, and once per
//! period decides whether that period was worked. A period is worked when
//! the last recorded activity is younger than the period itself; worked
//! periods are reported to the dashboard, idle ones are silently skipped.
//!
//! Every collaborator is injected: time comes from a [`Clock`], timers
//! from a [`Scheduler`], signals from an [`EventSource`], persistence from
//! a [`StateStore`], reporting from an [`ActivityReporter`]. Display and
//! notifications are optional; without them the render step is skipped.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use worktick::api::HttpReporter;
//! use worktick::libs::events::SignalBus;
//! use worktick::libs::scheduler::TokioScheduler;
//! use worktick::libs::tracker::ActivityTracker;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let bus = SignalBus::new();
//! let tracker = ActivityTracker::builder("C1")
//!     .reporter(Arc::new(HttpReporter::new("http://127.0.0.1:5000")))
//!     .scheduler(Arc::new(TokioScheduler::current()?))
//!     .events(Arc::new(bus.clone()))
//!     .build()?;
//! tracker.start();
//! // ...
//! tracker.dispose();
//! # Ok(())
//! # }
//! ```

use crate::api::{ActivityReporter, HeartbeatResult, ReportError};
use crate::libs::clock::{Clock, Millis, SystemClock};
use crate::libs::config::TrackerConfig;
use crate::libs::events::{ActivitySignal, EventSource, SubscriptionId};
use crate::libs::messages::Message;
use crate::libs::scheduler::{Scheduler, TimerId, TimerTask, TokioScheduler};
use crate::libs::snapshot::{PersistedSnapshot, SnapshotStore};
use crate::libs::status::{ActivityStatus, TrackerPhase, TrackerStats};
use crate::libs::store::{MemoryStore, StateStore};
use crate::libs::view::{NotificationLevel, Notifier, StatusDisplay};
use crate::{msg_bail_anyhow, msg_error, msg_info};
use anyhow::Result;
use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Last-activity value meaning "long ago": any elapsed check sees it as stale.
pub const INACTIVE_SENTINEL: Millis = 0;

/// Minutes past the hour at which a milestone notification is shown.
const MILESTONE_MINUTE: u64 = 5;

/// Mutable tracker state as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerState {
    pub challenge_id: String,
    pub paused: bool,
    pub last_activity_time: Millis,
    pub is_active: bool,
}

/// What a single [`ActivityTracker::tick`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Paused,
    Idle { elapsed: Millis },
    Logged(HeartbeatResult),
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct Activity {
    paused: bool,
    last_activity_time: Millis,
}

#[derive(Debug, Clone, Copy)]
struct Timers {
    report: TimerId,
    status: TimerId,
}

struct Inner {
    challenge_id: String,
    config: TrackerConfig,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    reporter: Arc<dyn ActivityReporter>,
    snapshots: SnapshotStore,
    display: Option<Arc<dyn StatusDisplay>>,
    notifier: Option<Arc<dyn Notifier>>,
    events: Option<Arc<dyn EventSource>>,
    activity: Mutex<Activity>,
    timers: Mutex<Option<Timers>>,
    subscription: Mutex<Option<SubscriptionId>>,
}

/// Cheap-to-clone handle to a tracker. Clones control the same tracker.
#[derive(Clone)]
pub struct ActivityTracker {
    inner: Arc<Inner>,
}

pub struct TrackerBuilder {
    challenge_id: String,
    config: TrackerConfig,
    clock: Option<Arc<dyn Clock>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    reporter: Option<Arc<dyn ActivityReporter>>,
    store: Option<Arc<dyn StateStore>>,
    display: Option<Arc<dyn StatusDisplay>>,
    notifier: Option<Arc<dyn Notifier>>,
    events: Option<Arc<dyn EventSource>>,
}

impl TrackerBuilder {
    pub fn config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn ActivityReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn display(mut self, display: Arc<dyn StatusDisplay>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSource>) -> Self {
        self.events = Some(events);
        self
    }

    /// Creates the tracker, restoring a fresh snapshot for the same
    /// challenge if one exists, and subscribes to the event source.
    ///
    /// Defaults: system clock, in-memory store, tokio scheduler on the
    /// current runtime. A reporter is required.
    pub fn build(self) -> Result<ActivityTracker> {
        let Some(reporter) = self.reporter else {
            msg_bail_anyhow!(Message::TrackerReporterMissing);
        };
        let scheduler: Arc<dyn Scheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(TokioScheduler::current()?),
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let snapshots = SnapshotStore::new(store, self.config.storage_key.clone(), self.config.state_ttl_millis());

        let now = clock.now_millis();
        let activity = match snapshots.load(&self.challenge_id, now) {
            Some(snapshot) => Activity {
                paused: snapshot.paused,
                last_activity_time: snapshot.last_activity_time,
            },
            None => Activity {
                paused: false,
                last_activity_time: now,
            },
        };

        let tracker = ActivityTracker {
            inner: Arc::new(Inner {
                challenge_id: self.challenge_id,
                config: self.config,
                clock,
                scheduler,
                reporter,
                snapshots,
                display: self.display,
                notifier: self.notifier,
                events: self.events,
                activity: Mutex::new(activity),
                timers: Mutex::new(None),
                subscription: Mutex::new(None),
            }),
        };
        tracker.subscribe();
        Ok(tracker)
    }
}

impl ActivityTracker {
    pub fn builder(challenge_id: impl Into<String>) -> TrackerBuilder {
        TrackerBuilder {
            challenge_id: challenge_id.into(),
            config: TrackerConfig::default(),
            clock: None,
            scheduler: None,
            reporter: None,
            store: None,
            display: None,
            notifier: None,
            events: None,
        }
    }

    pub fn challenge_id(&self) -> &str {
        &self.inner.challenge_id
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    fn now(&self) -> Millis {
        self.inner.clock.now_millis()
    }

    // The subscription holds only a weak reference, so a forgotten
    // dispose() does not keep the tracker alive through the event source.
    fn subscribe(&self) {
        let Some(events) = &self.inner.events else { return };
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let id = events.subscribe(Arc::new(move |signal| {
            if let Some(inner) = weak.upgrade() {
                ActivityTracker { inner }.handle_signal(signal);
            }
        }));
        *self.inner.subscription.lock() = Some(id);
    }

    /// Routes one interaction signal.
    ///
    /// Leaving signals (focus lost, page hidden) always make activity
    /// stale; every other signal records activity unless paused.
    pub fn handle_signal(&self, signal: ActivitySignal) {
        if signal.forces_idle() {
            self.mark_inactive_immediately();
        } else if !self.is_paused() {
            self.record_activity();
        }
    }

    pub fn record_activity(&self) {
        let now = self.now();
        self.inner.activity.lock().last_activity_time = now;
        self.refresh_status();
    }

    /// Pushes the last activity into the far past, regardless of pause.
    pub fn mark_inactive_immediately(&self) {
        self.inner.activity.lock().last_activity_time = INACTIVE_SENTINEL;
    }

    pub fn is_paused(&self) -> bool {
        self.inner.activity.lock().paused
    }

    pub fn is_running(&self) -> bool {
        self.inner.timers.lock().is_some()
    }

    pub fn pause(&self) {
        self.inner.activity.lock().paused = true;
        self.refresh_status();
        self.persist();
        self.notify(Message::TrackingPaused, NotificationLevel::Info);
    }

    pub fn resume(&self) {
        self.inner.activity.lock().paused = false;
        self.record_activity();
        self.persist();
        self.notify(Message::TrackingResumed, NotificationLevel::Success);
    }

    pub fn toggle(&self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Starts the reporting and status timers. A running tracker is
    /// stopped first, so `start` doubles as a restart.
    pub fn start(&self) {
        if self.is_running() {
            self.stop();
        }
        msg_info!(Message::TrackerStarted(self.inner.challenge_id.clone()));

        let report = self.inner.scheduler.schedule_periodic(self.inner.config.period(), self.report_task());
        let status = self.inner.scheduler.schedule_periodic(self.inner.config.status_refresh(), self.status_task());
        *self.inner.timers.lock() = Some(Timers { report, status });

        self.refresh_status();
        self.persist();
    }

    pub fn stop(&self) {
        if let Some(timers) = self.inner.timers.lock().take() {
            self.inner.scheduler.cancel(timers.report);
            self.inner.scheduler.cancel(timers.status);
        }
        msg_info!(Message::TrackerStopped);
        self.persist();
    }

    /// Stops the timers and drops the event subscription. Reports already
    /// in flight are not aborted.
    pub fn dispose(&self) {
        if self.is_running() {
            self.stop();
        }
        let subscription = self.inner.subscription.lock().take();
        if let (Some(events), Some(id)) = (&self.inner.events, subscription) {
            events.unsubscribe(id);
        }
        tracing::debug!(challenge_id = %self.inner.challenge_id, "{}", Message::TrackerDisposed);
    }

    /// One periodic evaluation: reports the period if it was worked.
    pub async fn tick(&self) -> TickOutcome {
        let activity = *self.inner.activity.lock();
        if activity.paused {
            return TickOutcome::Paused;
        }

        let elapsed = self.now().saturating_sub(activity.last_activity_time);
        if elapsed >= self.inner.config.period_millis() {
            tracing::debug!("{}", Message::NoActivityDetected(self.inner.config.check_interval / 60));
            return TickOutcome::Idle { elapsed };
        }

        match self.inner.reporter.log_activity(&self.inner.challenge_id).await {
            Ok(result) => {
                self.update_work_time(result.total_minutes);
                if result.total_minutes % 60 == MILESTONE_MINUTE {
                    self.notify(Message::HoursLogged(result.total_minutes / 60), NotificationLevel::Success);
                }
                msg_info!(Message::ActivityLogged(result.total_minutes));
                TickOutcome::Logged(result)
            }
            Err(ReportError::Status { status, detail }) => {
                msg_error!(Message::ActivityLogFailed(format!("{} ({})", detail, status.as_u16())));
                TickOutcome::Failed
            }
            Err(e) => {
                msg_error!(Message::ActivityLogError(e.to_string()));
                TickOutcome::Failed
            }
        }
    }

    pub fn status(&self) -> ActivityStatus {
        let activity = *self.inner.activity.lock();
        let elapsed = self.now().saturating_sub(activity.last_activity_time);
        ActivityStatus::classify(activity.paused, elapsed, self.inner.config.activity_timeout_millis())
    }

    pub fn phase(&self) -> TrackerPhase {
        if !self.is_running() {
            return TrackerPhase::Stopped;
        }
        match self.status() {
            ActivityStatus::Paused => TrackerPhase::RunningPaused,
            ActivityStatus::Active => TrackerPhase::RunningActive,
            ActivityStatus::Inactive => TrackerPhase::RunningIdle,
        }
    }

    pub fn stats(&self) -> TrackerStats {
        let activity = *self.inner.activity.lock();
        let elapsed = self.now().saturating_sub(activity.last_activity_time);
        TrackerStats {
            is_active: elapsed < self.inner.config.activity_timeout_millis(),
            is_paused: activity.paused,
            last_activity: activity.last_activity_time,
            time_since_activity: elapsed,
        }
    }

    pub fn state(&self) -> TrackerState {
        let stats = self.stats();
        TrackerState {
            challenge_id: self.inner.challenge_id.clone(),
            paused: stats.is_paused,
            last_activity_time: stats.last_activity,
            is_active: stats.is_active,
        }
    }

    /// Renders the current status, if a display is attached.
    pub fn refresh_status(&self) {
        if let Some(display) = &self.inner.display {
            display.render_status(self.status());
        }
    }

    fn update_work_time(&self, total_minutes: u64) {
        if let Some(display) = &self.inner.display {
            display.render_work_time(total_minutes);
        }
    }

    fn notify(&self, message: Message, level: NotificationLevel) {
        if let Some(notifier) = &self.inner.notifier {
            notifier.notify(&message.to_string(), level);
        }
    }

    fn persist(&self) {
        let activity = *self.inner.activity.lock();
        let snapshot = PersistedSnapshot {
            challenge_id: self.inner.challenge_id.clone(),
            paused: activity.paused,
            last_activity_time: activity.last_activity_time,
            timestamp: self.now(),
        };
        if let Err(e) = self.inner.snapshots.save(&snapshot) {
            tracing::warn!("{}", Message::StateSaveFailed(e.to_string()));
        }
    }

    fn report_task(&self) -> TimerTask {
        let weak = Arc::downgrade(&self.inner);
        Box::new(move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    ActivityTracker { inner }.tick().await;
                }
            }
            .boxed()
        })
    }

    fn status_task(&self) -> TimerTask {
        let weak = Arc::downgrade(&self.inner);
        Box::new(move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    ActivityTracker { inner }.refresh_status();
                }
            }
            .boxed()
        })
    }
}
