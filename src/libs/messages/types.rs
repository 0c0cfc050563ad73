/// Every user-facing text worktick prints, grouped by concern.
///
/// Texts live in `display.rs`; call sites only pick a variant and its
/// parameters.
#[derive(Debug, Clone)]
pub enum Message {
    // === TRACKER MESSAGES ===
    TrackerStarted(String), // challenge id
    TrackerStopped,
    TrackerDisposed,
    TrackerReporterMissing,
    TrackingPaused,
    TrackingResumed,
    HoursLogged(u64),        // whole hours
    ActivityLogged(u64),     // total minutes today
    NoActivityDetected(u64), // period in minutes
    ActivityLogFailed(String),
    ActivityLogError(String),
    StateLoadFailed(String),
    StateSaveFailed(String),
    WorkTimeToday(u64), // total minutes

    // === WATCH MESSAGES ===
    WatchControls,
    WatchUnknownCommand(String),
    WatchStatsLine {
        status: String,
        seconds_since_activity: i64,
    },
    ChallengeIdEmpty,
    WatcherReceivedSigterm,
    WatcherReceivedSigint,
    WatcherReceivedCtrlC,
    WatcherCtrlCListenFailed(String),
    WatcherShuttingDown,
    WatcherStdinClosed,
    ErrorInRdevListener(String),

    // === STATUS MESSAGES ===
    SnapshotHeader(String),        // challenge id
    SnapshotNotFound(String),      // challenge id
    SnapshotOtherChallenge(String), // stored challenge id
    SnapshotStale(i64),            // minutes since save

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigModuleServer,
    ConfigModuleTracker,

    // === PROMPTS ===
    PromptSelectModules,
    PromptServerApiUrl,
    PromptCheckInterval,
    PromptActivityTimeout,
    PromptStatusInterval,
    PromptStateTtl,
    PromptStorageKey,

    // === FILE SYSTEM MESSAGES ===
    DataStoragePathError,
}
