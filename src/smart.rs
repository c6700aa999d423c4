//! Ninja-style smart terminal output.
//!
//! [`SmartStatusOutput`] keeps a single bold status line at the bottom of the terminal,
//! rewriting it in place for every progress update, while permanent output (messages,
//! command output, raw writes) is printed above it. All rendering goes through one lock,
//! so concurrent build workers never interleave partial lines, and a background
//! [`ResizeWatcher`] keeps the terminal width current so the status line never wraps.

use crate::error::{Result, StatusError};
use crate::format::Formatter;
use crate::resize::ResizeWatcher;
use crate::status::{Action, ActionResult, Counts, MsgLevel, StatusOutput};
use crate::terminal::WidthProbe;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use unicode_width::UnicodeWidthChar;

/// Move the cursor to the start of the line.
pub const CARRIAGE_RETURN: &str = "\r";
/// Clear from the cursor to the end of the line.
pub const CLEAR_TO_EOL: &str = "\x1b[K";
/// Turn on bold.
pub const BOLD_ON: &str = "\x1b[1m";
/// Reset all attributes.
pub const ATTRIBUTES_OFF: &str = "\x1b[0m";

/// Terminal-facing state. Only ever touched with the lock held.
struct RenderState<W> {
    writer: W,
    /// True when the cursor sits at the start of an empty line
    have_blank_line: bool,
    /// Last known column count, 0 when unknown
    term_width: usize,
}

impl<W: Write> RenderState<W> {
    fn new(writer: W, term_width: usize) -> Self {
        Self {
            writer,
            have_blank_line: true,
            term_width,
        }
    }

    fn print_line(&mut self, bytes: &[u8]) -> io::Result<()> {
        let result = self.write_line(bytes);
        // A failed write may have left part of a line on screen.
        self.have_blank_line = result.is_ok();
        result
    }

    fn write_line(&mut self, bytes: &[u8]) -> io::Result<()> {
        if !self.have_blank_line {
            self.writer.write_all(CARRIAGE_RETURN.as_bytes())?;
            self.writer.write_all(CLEAR_TO_EOL.as_bytes())?;
        }
        self.writer.write_all(bytes)?;
        if bytes.last() != Some(&b'\n') {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn set_status_line(&mut self, text: &str) -> io::Result<()> {
        let mut text = match text.find('\n') {
            Some(idx) => &text[..idx],
            None => text,
        };

        // A line wider than the terminal would wrap, and the next \r would only return
        // to the start of the wrapped part.
        if self.term_width > 0 {
            text = elide(text, self.term_width);
        }

        // Written as one buffer so the line reaches the sink in a single write.
        let line = format!(
            "{}{}{}{}{}",
            CARRIAGE_RETURN, BOLD_ON, text, ATTRIBUTES_OFF, CLEAR_TO_EOL
        );
        self.writer.write_all(line.as_bytes())?;
        self.have_blank_line = false;
        Ok(())
    }

    fn request_permanent_line(&mut self) -> io::Result<()> {
        if !self.have_blank_line {
            self.writer.write_all(b"\n")?;
            self.have_blank_line = true;
        }
        Ok(())
    }

    fn update_term_width(&mut self, probe: &dyn WidthProbe) {
        if let Some(width) = probe.width() {
            if width != self.term_width {
                log::debug!("terminal width changed: {} -> {}", self.term_width, width);
            }
            self.term_width = width;
        }
    }
}

/// Cut `text` so it occupies at most `width` terminal columns.
///
/// This is a plain hard cut at the right edge; the middle of the line is not elided.
/// Characters are never split. Control characters count as one column.
pub fn elide(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        let cols = ch.width().unwrap_or(1);
        if used + cols > width {
            return &text[..idx];
        }
        used += cols;
    }
    text
}

/// Status output for interactive terminals.
pub struct SmartStatusOutput<W: Write + Send + 'static> {
    state: Arc<Mutex<RenderState<W>>>,
    formatter: Box<dyn Formatter>,
    watcher: Mutex<Option<ResizeWatcher>>,
}

impl<W: Write + Send + 'static> SmartStatusOutput<W> {
    /// Create a renderer writing to `writer` and subscribe it to terminal resizes.
    pub fn new<F, P>(writer: W, formatter: F, probe: P) -> Result<Self>
    where
        F: Formatter + 'static,
        P: WidthProbe + 'static,
    {
        Self::build(writer, Box::new(formatter), Arc::new(probe), None)
    }

    /// Like [`SmartStatusOutput::new`], additionally signalling `handled` each time a
    /// resize notification has been applied.
    pub fn with_resize_hook<F, P>(
        writer: W,
        formatter: F,
        probe: P,
        handled: UnboundedSender<()>,
    ) -> Result<Self>
    where
        F: Formatter + 'static,
        P: WidthProbe + 'static,
    {
        Self::build(writer, Box::new(formatter), Arc::new(probe), Some(handled))
    }

    pub(crate) fn build(
        writer: W,
        formatter: Box<dyn Formatter>,
        probe: Arc<dyn WidthProbe>,
        handled: Option<UnboundedSender<()>>,
    ) -> Result<Self> {
        let mut state = RenderState::new(writer, 0);
        state.update_term_width(probe.as_ref());
        let state = Arc::new(Mutex::new(state));

        let watcher = {
            let state = Arc::clone(&state);
            ResizeWatcher::start(move || {
                state.lock().update_term_width(probe.as_ref());
                if let Some(handled) = &handled {
                    // The receiver going away only means nobody is waiting any more.
                    let _ = handled.send(());
                }
            })?
        };

        Ok(Self {
            state,
            formatter,
            watcher: Mutex::new(Some(watcher)),
        })
    }

    /// Print `bytes` as a permanent line, clearing any status line first.
    pub fn print_line(&self, bytes: &[u8]) -> Result<()> {
        self.state.lock().print_line(bytes)?;
        Ok(())
    }

    /// Replace the status line with `text`.
    pub fn set_status_line(&self, text: &str) -> Result<()> {
        self.state.lock().set_status_line(text)?;
        Ok(())
    }

    /// Commit the current status line so the next output starts on a fresh line.
    pub fn request_permanent_line(&self) -> Result<()> {
        self.state.lock().request_permanent_line()?;
        Ok(())
    }

    /// Whether the cursor is at the start of an empty line.
    pub fn have_blank_line(&self) -> bool {
        self.state.lock().have_blank_line
    }

    /// Terminal width used for elision, 0 when unknown.
    pub fn term_width(&self) -> usize {
        self.state.lock().term_width
    }

    /// Whether the resize subscription is still active.
    pub fn is_watching_resizes(&self) -> bool {
        self.watcher
            .lock()
            .as_ref()
            .map_or(false, ResizeWatcher::is_running)
    }

    /// Run `f` against the sink with the render lock held.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.state.lock().writer)
    }

    /// Stop watching resizes and hand back the sink.
    pub fn into_inner(self) -> Result<W> {
        let Self { state, watcher, .. } = self;
        if let Some(mut watcher) = watcher.into_inner() {
            watcher.stop();
        }
        match Arc::try_unwrap(state) {
            Ok(state) => Ok(state.into_inner().writer),
            Err(_) => Err(StatusError::other("render state is still shared")),
        }
    }

    fn stop_watcher(&self) {
        // Taken out first: the watcher thread needs the render lock to finish its
        // current notification, so it must not be joined while holding that lock.
        let watcher = self.watcher.lock().take();
        if let Some(mut watcher) = watcher {
            watcher.stop();
        }
    }
}

impl<W: Write + Send + 'static> StatusOutput for SmartStatusOutput<W> {
    fn message(&self, level: MsgLevel, message: &str) -> Result<()> {
        if level < MsgLevel::Status {
            return Ok(());
        }

        let text = self.formatter.message(level, message);

        let mut state = self.state.lock();
        if level > MsgLevel::Status {
            state.print_line(text.as_bytes())?;
        } else {
            state.set_status_line(&text)?;
        }
        Ok(())
    }

    fn start_action(&self, action: &Action, counts: Counts) -> Result<()> {
        let line = self.formatter.progress(counts) + action.display_text();

        self.state.lock().set_status_line(&line)?;
        Ok(())
    }

    fn finish_action(&self, result: &ActionResult, counts: Counts) -> Result<()> {
        let line = self.formatter.progress(counts) + result.action.display_text();
        let output = self.formatter.result(result);

        let mut state = self.state.lock();
        state.set_status_line(&line)?;
        if !output.is_empty() {
            state.request_permanent_line()?;
            state.print_line(output.as_bytes())?;
        }
        Ok(())
    }

    fn write_raw(&self, bytes: &[u8]) -> Result<usize> {
        self.state.lock().print_line(bytes)?;
        Ok(bytes.len())
    }

    fn flush(&self) -> Result<()> {
        self.stop_watcher();

        let mut state = self.state.lock();
        state.request_permanent_line()?;
        state.writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send + 'static> Write for &SmartStatusOutput<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_raw(buf)?)
    }

    /// Formats the whole message first: every write is its own permanent line.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.write_raw(args.to_string().as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.lock().writer.flush()
    }
}
