//! Persisted tracker state and the rules for restoring it.
//!
//! A snapshot is stored as JSON under a single key:
//!
//! ```json
//! {"challengeId":"C1","paused":false,"lastActivityTime":1700000000000,"timestamp":1700000060000}
//! ```
//!
//! It is restored only for the same challenge and only while it is younger
//! than the configured lifetime (one hour by default). Anything else,
//! including unreadable JSON, means "start from defaults".

use crate::libs::clock::Millis;
use crate::libs::messages::Message;
use crate::libs::store::{StateStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub challenge_id: String,
    pub paused: bool,
    pub last_activity_time: Millis,
    /// When the snapshot was written.
    pub timestamp: Millis,
}

/// What a lookup found for a given challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restore {
    Fresh(PersistedSnapshot),
    Missing,
    OtherChallenge(PersistedSnapshot),
    Stale { snapshot: PersistedSnapshot, age: Millis },
    Unreadable(String),
}

#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn StateStore>,
    key: String,
    ttl: Millis,
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn StateStore>, key: impl Into<String>, ttl: Millis) -> Self {
        Self {
            store,
            key: key.into(),
            ttl,
        }
    }

    pub fn inspect(&self, challenge_id: &str, now: Millis) -> Restore {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Restore::Missing,
            Err(e) => return Restore::Unreadable(e.to_string()),
        };
        let snapshot: PersistedSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => return Restore::Unreadable(e.to_string()),
        };

        if snapshot.challenge_id != challenge_id {
            return Restore::OtherChallenge(snapshot);
        }
        if snapshot.timestamp < 0 || snapshot.last_activity_time < 0 || snapshot.last_activity_time > snapshot.timestamp {
            return Restore::Unreadable(format!(
                "inconsistent times (lastActivityTime {}, timestamp {})",
                snapshot.last_activity_time, snapshot.timestamp
            ));
        }
        let Some(age) = now.checked_sub(snapshot.timestamp) else {
            return Restore::Unreadable(format!("timestamp {} out of range", snapshot.timestamp));
        };
        if age < self.ttl {
            Restore::Fresh(snapshot)
        } else {
            Restore::Stale { snapshot, age }
        }
    }

    /// Returns the snapshot only if it may be restored.
    pub fn load(&self, challenge_id: &str, now: Millis) -> Option<PersistedSnapshot> {
        match self.inspect(challenge_id, now) {
            Restore::Fresh(snapshot) => Some(snapshot),
            Restore::Unreadable(error) => {
                tracing::debug!("{}", Message::StateLoadFailed(error));
                None
            }
            _ => None,
        }
    }

    pub fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), StoreError> {
        let raw = serde_json::to_string(snapshot)?;
        self.store.set(&self.key, &raw)
    }
}
