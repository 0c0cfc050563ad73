//! Centralized user-facing messages.
//!
//! `Message` enumerates every text the application prints, `display`
//! renders them, and `macros` routes them either to the console or to
//! `tracing` depending on debug mode.

pub mod display;
pub mod macros;
pub mod types;

pub use types::Message;
