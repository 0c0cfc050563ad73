//! Output surfaces for the tracker: a status/work-time display and a
//! notification sink, plus their terminal implementation.

use crate::libs::clock::Millis;
use crate::libs::messages::Message;
use crate::libs::snapshot::PersistedSnapshot;
use crate::libs::status::ActivityStatus;
use crate::{msg_error, msg_info, msg_print, msg_success, msg_warning};
use chrono::{Local, TimeZone};
use parking_lot::Mutex;
use prettytable::{row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

pub trait StatusDisplay: Send + Sync {
    fn render_status(&self, status: ActivityStatus);
    /// `total_minutes` is today's total as reported by the server.
    fn render_work_time(&self, total_minutes: u64);
}

pub trait Notifier: Send + Sync {
    fn notify(&self, text: &str, level: NotificationLevel);
}

/// Console rendering. The status line is printed only when it changes,
/// since the tracker refreshes it every second.
#[derive(Default)]
pub struct Terminal {
    last_status: Mutex<Option<ActivityStatus>>,
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusDisplay for Terminal {
    fn render_status(&self, status: ActivityStatus) {
        let mut last = self.last_status.lock();
        if *last != Some(status) {
            *last = Some(status);
            msg_print!(format!("{} {}", status.icon(), status.label()));
        }
    }

    fn render_work_time(&self, total_minutes: u64) {
        msg_print!(Message::WorkTimeToday(total_minutes));
    }
}

impl Notifier for Terminal {
    fn notify(&self, text: &str, level: NotificationLevel) {
        match level {
            NotificationLevel::Info => msg_info!(text),
            NotificationLevel::Success => msg_success!(text),
            NotificationLevel::Warning => msg_warning!(text),
            NotificationLevel::Error => msg_error!(text),
        }
    }
}

fn format_millis(millis: Millis) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

pub fn snapshot_table(snapshot: &PersistedSnapshot) -> Table {
    let mut table = Table::new();
    table.add_row(row!["CHALLENGE", "PAUSED", "LAST ACTIVITY", "SAVED AT"]);
    table.add_row(row![
        snapshot.challenge_id,
        snapshot.paused,
        format_millis(snapshot.last_activity_time),
        format_millis(snapshot.timestamp)
    ]);
    table
}
