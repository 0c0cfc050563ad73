//! Clients for the dashboard server.
//!
//! The tracker talks to the server through [`ActivityReporter`], so tests
//! and other hosts can substitute their own transport. [`HttpReporter`] is
//! the reqwest implementation used by the CLI.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod heartbeat;

pub use heartbeat::HttpReporter;

/// Server reply to a logged work-session tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatResult {
    /// Minutes logged today for the challenge, including this tick.
    pub total_minutes: u64,
}

#[derive(Debug, Error)]
pub enum ReportError {
    /// The server answered with a non-2xx status.
    #[error("{status}: {detail}")]
    Status { status: StatusCode, detail: String },

    /// The request never produced a usable response.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait ActivityReporter: Send + Sync {
    /// Reports one worked period for `challenge_id`.
    async fn log_activity(&self, challenge_id: &str) -> Result<HeartbeatResult, ReportError>;
}
