//! Build status domain types and the output trait.
//!
//! The build engine reports progress through a [`StatusOutput`]: free-form messages at a
//! [`MsgLevel`], plus start/finish notifications for each [`Action`] together with the
//! current [`Counts`]. Implementations decide how (and whether) each event reaches the
//! terminal.

use crate::error::Result;
use std::fmt;

/// Severity of a free-form message, ordered from least to most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MsgLevel {
    Verbose,
    Debug,
    Info,
    /// Threshold level: a message at exactly this level replaces the status line.
    Status,
    Print,
    Error,
}

impl MsgLevel {
    /// Prefix used when a message at this level is printed as a plain line.
    pub fn prefix(self) -> &'static str {
        match self {
            MsgLevel::Verbose => "verbose: ",
            MsgLevel::Debug => "debug: ",
            MsgLevel::Info => "info: ",
            MsgLevel::Status => "status: ",
            MsgLevel::Print => "",
            MsgLevel::Error => "error: ",
        }
    }
}

impl fmt::Display for MsgLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MsgLevel::Verbose => "verbose",
            MsgLevel::Debug => "debug",
            MsgLevel::Info => "info",
            MsgLevel::Status => "status",
            MsgLevel::Print => "print",
            MsgLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot of build progress supplied with every action event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Total number of actions known so far
    pub total_actions: usize,
    /// Actions currently executing
    pub running_actions: usize,
    /// Actions that have been started (running or finished)
    pub started_actions: usize,
    /// Actions that have completed
    pub finished_actions: usize,
}

impl Counts {
    /// Actions that have not been started yet.
    pub fn unstarted_actions(&self) -> usize {
        self.total_actions.saturating_sub(self.started_actions)
    }

    /// Percentage of finished actions, 0 when the total is unknown.
    pub fn percent_finished(&self) -> usize {
        if self.total_actions == 0 {
            0
        } else {
            self.finished_actions * 100 / self.total_actions
        }
    }
}

/// A unit of build work as described by the build engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    /// Human-readable description, e.g. `compiling foo.c`
    pub description: String,
    /// Files produced by the action
    pub outputs: Vec<String>,
    /// Command line executed for the action
    pub command: String,
}

impl Action {
    pub fn new(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            outputs: Vec::new(),
            command: command.into(),
        }
    }

    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    /// Text shown for this action: the description, or the command when none is set.
    pub fn display_text(&self) -> &str {
        if self.description.is_empty() {
            &self.command
        } else {
            &self.description
        }
    }
}

/// Outcome of a finished action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResult {
    pub action: Action,
    /// Captured stdout/stderr of the command
    pub output: String,
    /// Failure reason, `None` when the action succeeded
    pub error: Option<String>,
}

impl ActionResult {
    pub fn success(action: Action, output: impl Into<String>) -> Self {
        Self {
            action,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(action: Action, output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            action,
            output: output.into(),
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Destination for build status events.
///
/// Implementations are shared between build workers, so every method takes `&self` and
/// must serialize its own terminal access.
pub trait StatusOutput: Send + Sync {
    /// Report a free-form message at the given level
    fn message(&self, level: MsgLevel, message: &str) -> Result<()>;

    /// Report that an action has started
    fn start_action(&self, action: &Action, counts: Counts) -> Result<()>;

    /// Report that an action has finished, along with its captured output
    fn finish_action(&self, result: &ActionResult, counts: Counts) -> Result<()>;

    /// Write raw bytes as permanent output, returning the number of bytes consumed
    fn write_raw(&self, bytes: &[u8]) -> Result<usize>;

    /// Leave the terminal in a clean state before exit
    fn flush(&self) -> Result<()>;
}
