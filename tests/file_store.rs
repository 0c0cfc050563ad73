#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use worktick::api::{ActivityReporter, HeartbeatResult, ReportError};
    use worktick::libs::clock::ManualClock;
    use worktick::libs::data_storage::DataStorage;
    use worktick::libs::scheduler::ManualScheduler;
    use worktick::libs::store::{FileStore, StateStore};
    use worktick::libs::tracker::ActivityTracker;

    const T0: i64 = 1_700_000_000_000;

    struct NoopReporter;

    #[async_trait::async_trait]
    impl ActivityReporter for NoopReporter {
        async fn log_activity(&self, _challenge_id: &str) -> Result<HeartbeatResult, ReportError> {
            Ok(HeartbeatResult { total_minutes: 0 })
        }
    }

    struct FileStoreTestContext {
        temp_dir: TempDir,
        clock: ManualClock,
    }

    impl AsyncTestContext for FileStoreTestContext {
        async fn setup() -> Self {
            FileStoreTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
                clock: ManualClock::new(T0),
            }
        }
    }

    impl FileStoreTestContext {
        fn store(&self) -> FileStore {
            FileStore::new(DataStorage::at(self.temp_dir.path()))
        }

        fn tracker(&self, challenge_id: &str) -> ActivityTracker {
            ActivityTracker::builder(challenge_id)
                .clock(Arc::new(self.clock.clone()))
                .scheduler(Arc::new(ManualScheduler::new(self.clock.clone())))
                .reporter(Arc::new(NoopReporter))
                .store(Arc::new(self.store()))
                .build()
                .unwrap()
        }
    }

    #[test_context(FileStoreTestContext)]
    #[tokio::test]
    async fn test_missing_key_is_none(ctx: &mut FileStoreTestContext) {
        assert_eq!(ctx.store().get("nothing").unwrap(), None);
    }

    #[test_context(FileStoreTestContext)]
    #[tokio::test]
    async fn test_set_overwrites(ctx: &mut FileStoreTestContext) {
        let store = ctx.store();
        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(ctx.store().get("k").unwrap().as_deref(), Some("second"));
    }

    #[test_context(FileStoreTestContext)]
    #[tokio::test]
    async fn test_tracker_state_survives_restart(ctx: &mut FileStoreTestContext) {
        let first = ctx.tracker("C1");
        ctx.clock.advance(2_000);
        first.pause();
        first.dispose();

        let raw = fs::read_to_string(ctx.temp_dir.path().join("activityTrackerState.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["challengeId"], "C1");
        assert_eq!(json["paused"], true);
        assert_eq!(json["lastActivityTime"], T0);
        assert_eq!(json["timestamp"], T0 + 2_000);

        ctx.clock.advance(10 * 60 * 1000);
        let second = ctx.tracker("C1");
        assert!(second.is_paused());
        assert_eq!(second.stats().last_activity, T0);
    }
}
