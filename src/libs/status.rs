use crate::libs::clock::Millis;
use serde::Serialize;

/// Visual state of the tracker, refreshed every second while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Paused,
    Active,
    Inactive,
}

impl ActivityStatus {
    /// Paused wins over everything; otherwise activity younger than
    /// `activity_timeout` counts as active.
    pub fn classify(paused: bool, elapsed: Millis, activity_timeout: Millis) -> Self {
        if paused {
            ActivityStatus::Paused
        } else if elapsed < activity_timeout {
            ActivityStatus::Active
        } else {
            ActivityStatus::Inactive
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityStatus::Paused => "Paused",
            ActivityStatus::Active => "Active",
            ActivityStatus::Inactive => "Inactive",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ActivityStatus::Paused => "⏸",
            ActivityStatus::Active => "🟢",
            ActivityStatus::Inactive => "⚪",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ActivityStatus::Paused => "activity-status paused",
            ActivityStatus::Active => "activity-status active",
            ActivityStatus::Inactive => "activity-status inactive",
        }
    }
}

/// Lifecycle phase of a tracker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    Stopped,
    RunningActive,
    RunningIdle,
    RunningPaused,
}

/// Point-in-time view returned by `ActivityTracker::stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStats {
    pub is_active: bool,
    pub is_paused: bool,
    pub last_activity: Millis,
    pub time_since_activity: Millis,
}
