#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use test_context::{test_context, AsyncTestContext};
    use tokio::sync::Notify;
    use tokio::time::Duration;
    use worktick::api::{ActivityReporter, HeartbeatResult, ReportError};
    use worktick::libs::clock::{Clock, ManualClock, Millis};
    use worktick::libs::events::{ActivitySignal, SignalBus};
    use worktick::libs::scheduler::{ManualScheduler, TokioScheduler};
    use worktick::libs::status::{ActivityStatus, TrackerPhase};
    use worktick::libs::store::{MemoryStore, StateStore};
    use worktick::libs::tracker::{ActivityTracker, TickOutcome, INACTIVE_SENTINEL};
    use worktick::libs::view::{NotificationLevel, Notifier, StatusDisplay};

    /// t=0 of every scenario.
    const T0: Millis = 1_700_000_000_000;
    const PERIOD: Millis = 300_000;
    const HOUR: Millis = 3_600_000;

    /// Reporter that records calls and replays scripted replies.
    /// `Ok(total)` answers with that total, `Err(code)` with an HTTP error.
    #[derive(Default)]
    struct FakeReporter {
        calls: Mutex<Vec<String>>,
        replies: Mutex<VecDeque<Result<u64, u16>>>,
    }

    impl FakeReporter {
        fn script(&self, replies: &[Result<u64, u16>]) {
            self.replies.lock().unwrap().extend(replies.iter().copied());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ActivityReporter for FakeReporter {
        async fn log_activity(&self, challenge_id: &str) -> Result<HeartbeatResult, ReportError> {
            let count = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(challenge_id.to_string());
                calls.len() as u64
            };
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(total_minutes)) => Ok(HeartbeatResult { total_minutes }),
                Some(Err(code)) => Err(ReportError::Status {
                    status: StatusCode::from_u16(code).unwrap(),
                    detail: "scripted failure".to_string(),
                }),
                None => Ok(HeartbeatResult { total_minutes: count * 5 }),
            }
        }
    }

    /// Reporter whose request stays pending until released.
    #[derive(Default)]
    struct GatedReporter {
        entered: Notify,
        release: Notify,
        completed: AtomicBool,
    }

    #[async_trait]
    impl ActivityReporter for GatedReporter {
        async fn log_activity(&self, _challenge_id: &str) -> Result<HeartbeatResult, ReportError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.completed.store(true, Ordering::SeqCst);
            Ok(HeartbeatResult { total_minutes: 20 })
        }
    }

    #[derive(Default)]
    struct RecordingView {
        statuses: Mutex<Vec<ActivityStatus>>,
        work_times: Mutex<Vec<u64>>,
        notifications: Mutex<Vec<(String, NotificationLevel)>>,
    }

    impl RecordingView {
        fn last_status(&self) -> Option<ActivityStatus> {
            self.statuses.lock().unwrap().last().copied()
        }

        fn notifications(&self) -> Vec<(String, NotificationLevel)> {
            self.notifications.lock().unwrap().clone()
        }
    }

    impl StatusDisplay for RecordingView {
        fn render_status(&self, status: ActivityStatus) {
            self.statuses.lock().unwrap().push(status);
        }

        fn render_work_time(&self, total_minutes: u64) {
            self.work_times.lock().unwrap().push(total_minutes);
        }
    }

    impl Notifier for RecordingView {
        fn notify(&self, text: &str, level: NotificationLevel) {
            self.notifications.lock().unwrap().push((text.to_string(), level));
        }
    }

    struct TrackerTestContext {
        clock: ManualClock,
        scheduler: Arc<ManualScheduler>,
        reporter: Arc<FakeReporter>,
        view: Arc<RecordingView>,
        store: MemoryStore,
        bus: SignalBus,
    }

    impl AsyncTestContext for TrackerTestContext {
        async fn setup() -> Self {
            let clock = ManualClock::new(T0);
            TrackerTestContext {
                scheduler: Arc::new(ManualScheduler::new(clock.clone())),
                clock,
                reporter: Arc::new(FakeReporter::default()),
                view: Arc::new(RecordingView::default()),
                store: MemoryStore::new(),
                bus: SignalBus::new(),
            }
        }
    }

    impl TrackerTestContext {
        fn tracker(&self, challenge_id: &str) -> ActivityTracker {
            ActivityTracker::builder(challenge_id)
                .clock(Arc::new(self.clock.clone()))
                .scheduler(self.scheduler.clone())
                .reporter(self.reporter.clone())
                .store(Arc::new(self.store.clone()))
                .display(self.view.clone())
                .notifier(self.view.clone())
                .events(Arc::new(self.bus.clone()))
                .build()
                .unwrap()
        }

        fn at(&self, offset: Millis) {
            self.clock.set(T0 + offset);
        }
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_status_follows_activity_window(ctx: &mut TrackerTestContext) {
        let tracker = ctx.tracker("C1");
        tracker.record_activity();
        assert_eq!(ctx.view.last_status(), Some(ActivityStatus::Active));

        ctx.at(29_999);
        assert_eq!(tracker.status(), ActivityStatus::Active);
        ctx.at(30_000);
        assert_eq!(tracker.status(), ActivityStatus::Inactive);
        ctx.at(10 * HOUR);
        assert_eq!(tracker.status(), ActivityStatus::Inactive);

        tracker.pause();
        assert_eq!(tracker.status(), ActivityStatus::Paused);
        tracker.record_activity();
        assert_eq!(tracker.status(), ActivityStatus::Paused);
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_tick_reports_only_worked_periods(ctx: &mut TrackerTestContext) {
        let tracker = ctx.tracker("C1");
        tracker.record_activity();

        ctx.at(200_000);
        assert_eq!(tracker.tick().await, TickOutcome::Logged(HeartbeatResult { total_minutes: 5 }));
        assert_eq!(ctx.reporter.calls(), vec!["C1".to_string()]);

        ctx.at(650_000);
        assert_eq!(tracker.tick().await, TickOutcome::Idle { elapsed: 650_000 });
        assert_eq!(ctx.reporter.calls().len(), 1);
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_elapsed_equal_to_period_is_idle(ctx: &mut TrackerTestContext) {
        let tracker = ctx.tracker("C1");
        ctx.at(PERIOD - 1);
        assert!(matches!(tracker.tick().await, TickOutcome::Logged(_)));
        ctx.at(PERIOD);
        assert_eq!(tracker.tick().await, TickOutcome::Idle { elapsed: PERIOD });
        assert_eq!(ctx.reporter.calls().len(), 1);
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_paused_tracker_ignores_signals_and_ticks(ctx: &mut TrackerTestContext) {
        let tracker = ctx.tracker("C1");
        ctx.at(1_000);
        tracker.pause();

        ctx.at(5_000);
        ctx.bus.emit(ActivitySignal::KeyPress);
        ctx.bus.emit(ActivitySignal::PointerMove);
        assert_eq!(tracker.stats().last_activity, T0);
        assert_eq!(tracker.tick().await, TickOutcome::Paused);
        assert!(ctx.reporter.calls().is_empty());

        ctx.at(9_000);
        tracker.resume();
        assert_eq!(tracker.stats().last_activity, T0 + 9_000);
        assert!(!tracker.is_paused());

        let notifications = ctx.view.notifications();
        assert_eq!(notifications[0], ("Work tracking paused".to_string(), NotificationLevel::Info));
        assert_eq!(notifications[1], ("Work tracking resumed".to_string(), NotificationLevel::Success));
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_signals_record_activity_when_running(ctx: &mut TrackerTestContext) {
        let tracker = ctx.tracker("C1");
        ctx.at(42_000);
        ctx.bus.emit(ActivitySignal::Scroll);
        assert_eq!(tracker.stats().last_activity, T0 + 42_000);
        ctx.at(43_000);
        ctx.bus.emit(ActivitySignal::PageVisible);
        assert_eq!(tracker.stats().last_activity, T0 + 43_000);
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_focus_loss_forces_idle_even_when_paused(ctx: &mut TrackerTestContext) {
        let tracker = ctx.tracker("C1");
        ctx.bus.emit(ActivitySignal::FocusLost);
        let stats = tracker.stats();
        assert_eq!(stats.last_activity, INACTIVE_SENTINEL);
        assert!(!stats.is_active);
        assert_eq!(tracker.tick().await, TickOutcome::Idle { elapsed: T0 });

        ctx.bus.emit(ActivitySignal::FocusGained);
        tracker.pause();
        ctx.bus.emit(ActivitySignal::PageHidden);
        assert_eq!(tracker.stats().last_activity, INACTIVE_SENTINEL);
        assert!(ctx.reporter.calls().is_empty());
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_pause_then_toggle_resumes(ctx: &mut TrackerTestContext) {
        let tracker = ctx.tracker("C1");
        ctx.at(1_000);
        tracker.pause();
        ctx.at(7_500);
        tracker.toggle();

        let stats = tracker.stats();
        assert!(!stats.is_paused);
        assert_eq!(stats.last_activity, T0 + 7_500);
        assert_eq!(stats.time_since_activity, 0);
        assert!(stats.is_active);

        tracker.toggle();
        assert!(tracker.is_paused());
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_state_restores_for_same_challenge_within_an_hour(ctx: &mut TrackerTestContext) {
        let first = ctx.tracker("C1");
        ctx.at(1_000);
        first.pause();

        ctx.at(HOUR);
        let second = ctx.tracker("C1");
        assert!(second.is_paused());
        assert_eq!(second.stats().last_activity, T0);
        assert_eq!(second.state().challenge_id, "C1");
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_stale_or_foreign_state_is_ignored(ctx: &mut TrackerTestContext) {
        let first = ctx.tracker("C1");
        first.pause();

        ctx.at(5_000);
        let other = ctx.tracker("C2");
        assert!(!other.is_paused());
        assert_eq!(other.stats().last_activity, T0 + 5_000);

        // The C2 tracker never persisted, so the C1 snapshot is still there.
        ctx.at(HOUR);
        let stale = ctx.tracker("C1");
        assert!(!stale.is_paused());
        assert_eq!(stale.stats().last_activity, T0 + HOUR);
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_garbage_state_falls_back_to_defaults(ctx: &mut TrackerTestContext) {
        ctx.store.set("activityTrackerState", "][").unwrap();
        let tracker = ctx.tracker("C1");
        assert!(!tracker.is_paused());
        assert_eq!(tracker.stats().last_activity, T0);
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_out_of_range_state_falls_back_to_defaults(ctx: &mut TrackerTestContext) {
        ctx.store
            .set(
                "activityTrackerState",
                r#"{"challengeId":"C1","paused":true,"lastActivityTime":0,"timestamp":-9223372036854775808}"#,
            )
            .unwrap();
        let tracker = ctx.tracker("C1");
        assert!(!tracker.is_paused());
        assert_eq!(tracker.stats().last_activity, T0);

        ctx.store
            .set(
                "activityTrackerState",
                &format!(
                    r#"{{"challengeId":"C1","paused":true,"lastActivityTime":-9223372036854775808,"timestamp":{}}}"#,
                    T0
                ),
            )
            .unwrap();
        let tracker = ctx.tracker("C1");
        assert!(!tracker.is_paused());
        assert_eq!(tracker.stats().last_activity, T0);
        assert_eq!(tracker.status(), ActivityStatus::Active);
        assert!(matches!(tracker.tick().await, TickOutcome::Logged(_)));
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_failed_report_keeps_counter(ctx: &mut TrackerTestContext) {
        ctx.reporter.script(&[Err(500), Ok(35)]);
        let tracker = ctx.tracker("C1");

        assert_eq!(tracker.tick().await, TickOutcome::Failed);
        assert!(ctx.view.work_times.lock().unwrap().is_empty());

        assert!(matches!(tracker.tick().await, TickOutcome::Logged(_)));
        assert_eq!(*ctx.view.work_times.lock().unwrap(), vec![35]);
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_milestone_at_five_past_the_hour(ctx: &mut TrackerTestContext) {
        ctx.reporter.script(&[Ok(60), Ok(65), Ok(125), Ok(185)]);
        let tracker = ctx.tracker("C1");
        for _ in 0..4 {
            tracker.tick().await;
        }

        let notifications: Vec<String> = ctx.view.notifications().into_iter().map(|(text, _)| text).collect();
        assert_eq!(
            notifications,
            vec![
                "Great work! 1 hour logged today".to_string(),
                "Great work! 2 hours logged today".to_string(),
                "Great work! 3 hours logged today".to_string(),
            ]
        );
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_timers_drive_ticks_and_status(ctx: &mut TrackerTestContext) {
        let tracker = ctx.tracker("C1");
        assert_eq!(tracker.phase(), TrackerPhase::Stopped);

        tracker.start();
        assert_eq!(ctx.scheduler.active_timers(), 2);
        assert_eq!(tracker.phase(), TrackerPhase::RunningActive);

        ctx.scheduler.advance(31_000).await;
        assert_eq!(ctx.view.last_status(), Some(ActivityStatus::Inactive));
        assert_eq!(tracker.phase(), TrackerPhase::RunningIdle);

        ctx.scheduler.advance(69_000).await;
        tracker.record_activity();
        ctx.scheduler.advance(200_000).await;
        assert_eq!(ctx.reporter.calls(), vec!["C1".to_string()]);

        ctx.scheduler.advance(PERIOD).await;
        assert_eq!(ctx.reporter.calls().len(), 1);

        tracker.pause();
        assert_eq!(tracker.phase(), TrackerPhase::RunningPaused);
        ctx.scheduler.advance(2_000).await;
        assert_eq!(ctx.view.last_status(), Some(ActivityStatus::Paused));

        tracker.stop();
        assert_eq!(tracker.phase(), TrackerPhase::Stopped);
        assert_eq!(ctx.scheduler.active_timers(), 0);
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_start_twice_restarts_timers(ctx: &mut TrackerTestContext) {
        let tracker = ctx.tracker("C1");
        tracker.start();
        tracker.start();
        assert_eq!(ctx.scheduler.active_timers(), 2);

        let saved = ctx.store.get("activityTrackerState").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(json["challengeId"], "C1");
        assert_eq!(json["paused"], false);
        assert_eq!(json["timestamp"], T0);
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_dispose_cancels_timers_and_subscription(ctx: &mut TrackerTestContext) {
        let tracker = ctx.tracker("C1");
        tracker.start();
        assert_eq!(ctx.bus.subscriber_count(), 1);

        tracker.dispose();
        assert_eq!(ctx.scheduler.active_timers(), 0);
        assert_eq!(ctx.bus.subscriber_count(), 0);

        ctx.at(50_000);
        ctx.bus.emit(ActivitySignal::KeyPress);
        assert_eq!(tracker.stats().last_activity, T0);
    }

    #[test_context(TrackerTestContext)]
    #[tokio::test]
    async fn test_tracker_without_display_or_notifier(ctx: &mut TrackerTestContext) {
        let tracker = ActivityTracker::builder("C1")
            .clock(Arc::new(ctx.clock.clone()))
            .scheduler(ctx.scheduler.clone())
            .reporter(ctx.reporter.clone())
            .build()
            .unwrap();
        tracker.start();
        tracker.pause();
        tracker.resume();
        ctx.scheduler.advance(PERIOD).await;
        assert_eq!(ctx.reporter.calls().len(), 0);
        assert_eq!(ctx.clock.now_millis(), T0 + PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_does_not_abort_report_in_flight() {
        let clock = ManualClock::new(T0);
        let reporter = Arc::new(GatedReporter::default());
        let view = Arc::new(RecordingView::default());
        let tracker = ActivityTracker::builder("C1")
            .clock(Arc::new(clock))
            .scheduler(Arc::new(TokioScheduler::current().unwrap()))
            .reporter(reporter.clone())
            .display(view.clone())
            .build()
            .unwrap();

        tracker.start();
        reporter.entered.notified().await;
        tracker.stop();
        assert!(!tracker.is_running());

        reporter.release.notify_one();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(reporter.completed.load(Ordering::SeqCst));
        assert_eq!(*view.work_times.lock().unwrap(), vec![20]);
    }

    #[tokio::test]
    async fn test_build_requires_reporter() {
        let result = ActivityTracker::builder("C1").build();
        assert!(result.is_err());
    }
}
