//! Display implementation for worktick messages.
//!
//! All message text is defined here, in one match, so call sites stay free
//! of string literals and wording changes happen in a single place.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === TRACKER MESSAGES ===
            Message::TrackerStarted(challenge_id) => format!("Activity tracker started for challenge {}", challenge_id),
            Message::TrackerStopped => "Activity tracker stopped".to_string(),
            Message::TrackerDisposed => "Activity tracker disposed".to_string(),
            Message::TrackerReporterMissing => "An activity reporter is required to build a tracker".to_string(),
            Message::TrackingPaused => "Work tracking paused".to_string(),
            Message::TrackingResumed => "Work tracking resumed".to_string(),
            Message::HoursLogged(hours) => {
                format!("Great work! {} hour{} logged today", hours, if *hours != 1 { "s" } else { "" })
            }
            Message::ActivityLogged(minutes) => format!("Activity logged: {} minutes today", minutes),
            Message::NoActivityDetected(minutes) => format!("No activity detected in the last {} minutes", minutes),
            Message::ActivityLogFailed(reason) => format!("Failed to log activity: {}", reason),
            Message::ActivityLogError(error) => format!("Error logging activity: {}", error),
            Message::StateLoadFailed(error) => format!("Error loading activity tracker state: {}", error),
            Message::StateSaveFailed(error) => format!("Error saving activity tracker state: {}", error),
            Message::WorkTimeToday(minutes) => {
                // Tenths of an hour, halves rounded up.
                let tenths = (minutes * 10 + 30) / 60;
                format!("{}.{} hours", tenths / 10, tenths % 10)
            }

            // === WATCH MESSAGES ===
            Message::WatchControls => "Commands: [p]ause, [r]esume, [t]oggle, [s]tats, [q]uit".to_string(),
            Message::WatchUnknownCommand(command) => format!("Unknown command '{}'", command),
            Message::WatchStatsLine {
                status,
                seconds_since_activity,
            } => format!("{} (last activity {}s ago)", status, seconds_since_activity),
            Message::ChallengeIdEmpty => "Challenge id must not be empty".to_string(),
            Message::WatcherReceivedSigterm => "Received SIGTERM, shutting down...".to_string(),
            Message::WatcherReceivedSigint => "Received SIGINT, shutting down...".to_string(),
            Message::WatcherReceivedCtrlC => "Received Ctrl+C, shutting down...".to_string(),
            Message::WatcherCtrlCListenFailed(error) => format!("Failed to listen for Ctrl+C: {}", error),
            Message::WatcherShuttingDown => "Shutting down tracker...".to_string(),
            Message::WatcherStdinClosed => "Input closed, keeping the tracker running until a signal arrives".to_string(),
            Message::ErrorInRdevListener(error) => format!("Error in rdev listener: {}", error),

            // === STATUS MESSAGES ===
            Message::SnapshotHeader(challenge_id) => format!("Saved tracker state for challenge {}", challenge_id),
            Message::SnapshotNotFound(challenge_id) => format!("No saved tracker state for challenge {}", challenge_id),
            Message::SnapshotOtherChallenge(stored) => format!("Saved tracker state belongs to challenge {}", stored),
            Message::SnapshotStale(minutes) => {
                format!("Saved tracker state is {} minutes old and will not be restored", minutes)
            }

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigModuleServer => "Server settings".to_string(),
            Message::ConfigModuleTracker => "Tracker settings".to_string(),

            // === PROMPTS ===
            Message::PromptSelectModules => "Select modules to configure".to_string(),
            Message::PromptServerApiUrl => "Dashboard server URL".to_string(),
            Message::PromptCheckInterval => "Reporting period (seconds)".to_string(),
            Message::PromptActivityTimeout => "Activity timeout (seconds)".to_string(),
            Message::PromptStatusInterval => "Status refresh interval (milliseconds)".to_string(),
            Message::PromptStateTtl => "Saved state lifetime (seconds)".to_string(),
            Message::PromptStorageKey => "Storage key".to_string(),

            // === FILE SYSTEM MESSAGES ===
            Message::DataStoragePathError => "Failed to resolve the data storage path".to_string(),
        };
        write!(f, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_time_rounds_halves_up() {
        assert_eq!(Message::WorkTimeToday(0).to_string(), "0.0 hours");
        assert_eq!(Message::WorkTimeToday(5).to_string(), "0.1 hours");
        assert_eq!(Message::WorkTimeToday(15).to_string(), "0.3 hours");
        assert_eq!(Message::WorkTimeToday(60).to_string(), "1.0 hours");
        assert_eq!(Message::WorkTimeToday(75).to_string(), "1.3 hours");
        assert_eq!(Message::WorkTimeToday(135).to_string(), "2.3 hours");
        assert_eq!(Message::WorkTimeToday(597).to_string(), "10.0 hours");
    }
}
