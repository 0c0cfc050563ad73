//! Core library modules for worktick.
//!
//! ## Features
//!
//! - **Tracker**: Idle detection, heartbeat ticks, pause/resume, state restore
//! - **Ports**: Clock, scheduler, event source and storage abstractions
//! - **Infrastructure**: Configuration, data storage, messaging
//! - **User Interface**: Terminal status rendering and notifications
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use worktick::api::HttpReporter;
//! use worktick::libs::tracker::ActivityTracker;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let tracker = ActivityTracker::builder("C1")
//!     .reporter(Arc::new(HttpReporter::new("http://127.0.0.1:5000")))
//!     .build()?;
//! tracker.start();
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod data_storage;
pub mod events;
pub mod input;
pub mod messages;
pub mod scheduler;
pub mod snapshot;
pub mod status;
pub mod store;
pub mod tracker;
pub mod view;
