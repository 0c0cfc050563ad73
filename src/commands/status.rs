//! Shows the tracker state saved for a challenge.

use crate::libs::{
    clock::{Clock, SystemClock},
    config::Config,
    data_storage::DataStorage,
    messages::Message,
    snapshot::{Restore, SnapshotStore},
    store::FileStore,
    view,
};
use crate::{msg_info, msg_print, msg_warning};
use anyhow::Result;
use clap::Args;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[arg(short, long, help = "Challenge identifier")]
    challenge: String,
}

pub fn cmd(args: StatusArgs) -> Result<()> {
    let tracker_config = Config::read()?.tracker.unwrap_or_default();
    let snapshots = SnapshotStore::new(
        Arc::new(FileStore::new(DataStorage::new())),
        tracker_config.storage_key.clone(),
        tracker_config.state_ttl_millis(),
    );

    match snapshots.inspect(&args.challenge, SystemClock.now_millis()) {
        Restore::Fresh(snapshot) => {
            msg_print!(Message::SnapshotHeader(snapshot.challenge_id.clone()), true);
            view::snapshot_table(&snapshot).printstd();
        }
        Restore::Stale { snapshot, age } => {
            msg_warning!(Message::SnapshotStale(age / 60_000));
            view::snapshot_table(&snapshot).printstd();
        }
        Restore::OtherChallenge(snapshot) => msg_info!(Message::SnapshotOtherChallenge(snapshot.challenge_id)),
        Restore::Missing => msg_info!(Message::SnapshotNotFound(args.challenge)),
        Restore::Unreadable(error) => msg_warning!(Message::StateLoadFailed(error)),
    }
    Ok(())
}
