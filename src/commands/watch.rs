//! Runs the activity tracker in the foreground.
//!
//! Global keyboard and mouse input feeds the tracker, the status line is
//! rendered in the terminal, and single-word commands on stdin pause,
//! resume or inspect it. Ctrl+C, SIGTERM or `q` dispose the tracker.

use crate::api::HttpReporter;
use crate::libs::{
    config::Config,
    data_storage::DataStorage,
    events::SignalBus,
    input::InputListener,
    messages::Message,
    scheduler::TokioScheduler,
    store::FileStore,
    tracker::ActivityTracker,
    view::Terminal,
};
use crate::{msg_bail_anyhow, msg_error, msg_info, msg_print, msg_warning};
use anyhow::Result;
use clap::Args;
use std::io::{self, BufRead, BufReader};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[arg(short, long, help = "Challenge identifier worked time is logged against")]
    challenge: String,
    #[arg(long, help = "Do not hook global keyboard and mouse input")]
    no_input: bool,
}

/// A line typed while watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Pause,
    Resume,
    Toggle,
    Stats,
    Quit,
}

impl Control {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "p" | "pause" => Some(Control::Pause),
            "r" | "resume" => Some(Control::Resume),
            "t" | "toggle" => Some(Control::Toggle),
            "s" | "stats" => Some(Control::Stats),
            "q" | "quit" | "exit" => Some(Control::Quit),
            _ => None,
        }
    }
}

pub async fn cmd(args: WatchArgs) -> Result<()> {
    let challenge_id = args.challenge.trim().to_string();
    if challenge_id.is_empty() {
        msg_bail_anyhow!(Message::ChallengeIdEmpty);
    }

    let config = Config::read()?;
    let bus = SignalBus::new();
    if !args.no_input {
        InputListener::spawn(bus.clone());
    }

    let terminal = Arc::new(Terminal::new());
    let tracker = ActivityTracker::builder(challenge_id)
        .config(config.tracker.clone().unwrap_or_default())
        .reporter(Arc::new(HttpReporter::new(&config.api_url())))
        .store(Arc::new(FileStore::new(DataStorage::new())))
        .scheduler(Arc::new(TokioScheduler::current()?))
        .display(terminal.clone())
        .notifier(terminal)
        .events(Arc::new(bus))
        .build()?;

    tracker.start();
    msg_info!(Message::WatchControls);

    let mut lines = spawn_line_reader(BufReader::new(io::stdin()));
    tokio::select! {
        _ = shutdown_signal() => {}
        _ = read_controls(&tracker, &mut lines) => {}
    }

    msg_info!(Message::WatcherShuttingDown);
    tracker.dispose();
    Ok(())
}

/// Applies one control to the tracker. Returns `false` on quit.
pub fn apply(tracker: &ActivityTracker, control: Control) -> bool {
    match control {
        Control::Pause => tracker.pause(),
        Control::Resume => tracker.resume(),
        Control::Toggle => tracker.toggle(),
        Control::Stats => {
            let stats = tracker.stats();
            msg_print!(Message::WatchStatsLine {
                status: tracker.status().label().to_string(),
                seconds_since_activity: stats.time_since_activity / 1000,
            });
        }
        Control::Quit => return false,
    }
    true
}

/// Reads lines on a plain thread. A blocked read there does not keep the
/// runtime from shutting down once a signal arrives.
pub fn spawn_line_reader<R: BufRead + Send + 'static>(reader: R) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

/// Applies typed controls until `quit`.
pub async fn read_controls(tracker: &ActivityTracker, lines: &mut mpsc::UnboundedReceiver<String>) {
    while let Some(line) = lines.recv().await {
        match Control::parse(&line) {
            Some(control) => {
                if !apply(tracker, control) {
                    return;
                }
            }
            None if line.trim().is_empty() => {}
            None => msg_warning!(Message::WatchUnknownCommand(line.trim().to_string())),
        }
    }
    // Without stdin (e.g. started in the background) only a signal stops the tracker.
    msg_info!(Message::WatcherStdinClosed);
    std::future::pending::<()>().await;
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        if let (Ok(mut sigterm), Ok(mut sigint)) = (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            tokio::select! {
                _ = sigterm.recv() => msg_info!(Message::WatcherReceivedSigterm),
                _ = sigint.recv() => msg_info!(Message::WatcherReceivedSigint),
            }
            return;
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => msg_info!(Message::WatcherReceivedCtrlC),
        Err(e) => {
            msg_error!(Message::WatcherCtrlCListenFailed(e.to_string()));
            std::future::pending::<()>().await
        }
    }
}
