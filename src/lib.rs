//! # statusline - Ninja-Style Build Status Output
//!
//! Renders build progress as a single, continuously rewritten status line
//! (`[42/100] compiling foo.c`) while letting ordinary log output scroll above it.
//!
//! ## Features
//!
//! - **Smart terminals**: bold in-place status line, cut to the terminal width
//! - **Resize aware**: a `SIGWINCH` watcher keeps the width current
//! - **Concurrent producers**: every event is rendered atomically under one lock
//! - **Dumb sinks**: pipes and `TERM=dumb` get plain line-oriented output
//! - **Configurable**: `NINJA_STATUS`-style progress templates
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`status`] - Build status events and the [`StatusOutput`] trait
//! - [`format`] - Turning events into display strings
//! - [`terminal`] - Terminal width queries
//! - [`resize`] - Resize notification subscription
//! - [`smart`] - The in-place status line renderer
//! - [`simple`] - Line-oriented fallback output
//! - [`output`] - Choosing between the two
//! - [`config`] - Template and behaviour settings

// Core modules
pub mod config;
pub mod error;
pub mod status;

// Rendering
pub mod format;
pub mod output;
pub mod simple;
pub mod smart;

// Terminal plumbing
pub mod resize;
pub mod terminal;

// Re-export commonly used types for convenience
pub use error::{Result, StatusError};

// Public API surface for external usage
pub use config::StatusConfig;
pub use format::{Formatter, StatusFormatter};
pub use output::new_status_output;
pub use simple::SimpleStatusOutput;
pub use smart::SmartStatusOutput;
pub use status::{Action, ActionResult, Counts, MsgLevel, StatusOutput};
pub use terminal::{FixedWidth, SharedWidth, TtyProbe, WidthProbe};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
