//! Terminal capability queries.
//!
//! The renderer only needs one fact about its terminal: how many columns it has. That
//! query sits behind [`WidthProbe`] so non-terminal sinks, tests and the demo binary can
//! supply their own answer.

use ratatui::crossterm::{terminal, tty::IsTty};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Answers "how wide is the terminal behind this sink?"
pub trait WidthProbe: Send + Sync {
    /// Current column count, or `None` when the sink is not an interactive terminal or
    /// the size cannot be determined.
    fn width(&self) -> Option<usize>;
}

/// Standard stream a [`TtyProbe`] inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn is_tty(self) -> bool {
        match self {
            Stream::Stdout => io::stdout().is_tty(),
            Stream::Stderr => io::stderr().is_tty(),
        }
    }
}

/// Queries the real terminal through crossterm.
#[derive(Debug, Clone, Copy)]
pub struct TtyProbe {
    stream: Stream,
}

impl TtyProbe {
    pub fn new(stream: Stream) -> Self {
        Self { stream }
    }

    pub fn stdout() -> Self {
        Self::new(Stream::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(Stream::Stderr)
    }
}

impl WidthProbe for TtyProbe {
    fn width(&self) -> Option<usize> {
        if !self.stream.is_tty() {
            return None;
        }
        match terminal::size() {
            Ok((cols, _rows)) if cols > 0 => Some(cols as usize),
            Ok(_) => None,
            Err(err) => {
                log::debug!("terminal size query failed: {}", err);
                None
            }
        }
    }
}

/// A width that never changes; `FixedWidth(None)` models a non-terminal sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidth(pub Option<usize>);

impl WidthProbe for FixedWidth {
    fn width(&self) -> Option<usize> {
        self.0
    }
}

/// A width that can be changed from another thread, standing in for a terminal being
/// resized. Zero means unavailable.
#[derive(Debug, Clone, Default)]
pub struct SharedWidth {
    cols: Arc<AtomicUsize>,
}

impl SharedWidth {
    pub fn new(cols: usize) -> Self {
        Self {
            cols: Arc::new(AtomicUsize::new(cols)),
        }
    }

    pub fn set(&self, cols: usize) {
        self.cols.store(cols, Ordering::SeqCst);
    }
}

impl WidthProbe for SharedWidth {
    fn width(&self) -> Option<usize> {
        match self.cols.load(Ordering::SeqCst) {
            0 => None,
            cols => Some(cols),
        }
    }
}

/// Whether a sink supports in-place status updates: it must report a width and `TERM`
/// must not be `dumb`.
pub fn is_smart_terminal(probe: &dyn WidthProbe) -> bool {
    let term = std::env::var("TERM").ok();
    supports_status_line(probe, term.as_deref())
}

fn supports_status_line(probe: &dyn WidthProbe, term: Option<&str>) -> bool {
    if term == Some("dumb") {
        return false;
    }
    probe.width().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_reports_its_value() {
        assert_eq!(FixedWidth(Some(80)).width(), Some(80));
        assert_eq!(FixedWidth(None).width(), None);
    }

    #[test]
    fn shared_width_tracks_updates() {
        let width = SharedWidth::new(80);
        let handle = width.clone();
        assert_eq!(width.width(), Some(80));

        handle.set(132);
        assert_eq!(width.width(), Some(132));

        handle.set(0);
        assert_eq!(width.width(), None);
    }

    #[test]
    fn dumb_terminals_are_not_smart() {
        let probe = FixedWidth(Some(80));
        assert!(supports_status_line(&probe, Some("xterm-256color")));
        assert!(supports_status_line(&probe, None));
        assert!(!supports_status_line(&probe, Some("dumb")));
    }

    #[test]
    fn sinks_without_width_are_not_smart() {
        assert!(!supports_status_line(&FixedWidth(None), Some("xterm")));
    }
}
