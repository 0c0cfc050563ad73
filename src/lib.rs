//! # Worktick - activity heartbeat tracker
//!
//! Watches keyboard and mouse activity and, once per period, reports a
//! worked period to a dashboard server that keeps today's total.
//!
//! ## Features
//!
//! - **Idle Detection**: A period counts only if there was input during it
//! - **Heartbeat Reporting**: `POST /log_activity` per worked period
//! - **Pause and Resume**: Tracking can be suspended at any time
//! - **State Restore**: Pause state survives restarts for up to an hour
//!
//! ## Usage
//!
//! ```rust,no_run
//! use worktick::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod libs;
