//! Line-oriented output for sinks that cannot redraw a status line.
//!
//! Used when the sink is a pipe, a file, or a `TERM=dumb` terminal: every finished action
//! is printed as its own line and no escape sequences are emitted.

use crate::error::Result;
use crate::format::Formatter;
use crate::status::{Action, ActionResult, Counts, MsgLevel, StatusOutput};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};

pub struct SimpleStatusOutput<W: Write + Send> {
    writer: Mutex<W>,
    formatter: Box<dyn Formatter>,
    quiet: bool,
}

impl<W: Write + Send> SimpleStatusOutput<W> {
    /// `quiet` suppresses the per-action progress lines; failures and output still print.
    pub fn new<F>(writer: W, formatter: F, quiet: bool) -> Self
    where
        F: Formatter + 'static,
    {
        Self::build(writer, Box::new(formatter), quiet)
    }

    pub(crate) fn build(writer: W, formatter: Box<dyn Formatter>, quiet: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            formatter,
            quiet,
        }
    }

    /// Run `f` against the sink with the lock held.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.writer.lock())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

fn write_line<W: Write>(writer: &mut W, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        writer.write_all(b"\n")?;
    }
    Ok(())
}

impl<W: Write + Send> StatusOutput for SimpleStatusOutput<W> {
    fn message(&self, level: MsgLevel, message: &str) -> Result<()> {
        if level < MsgLevel::Print {
            return Ok(());
        }
        let text = self.formatter.message(level, message);
        write_line(&mut *self.writer.lock(), &text)?;
        Ok(())
    }

    fn start_action(&self, _action: &Action, _counts: Counts) -> Result<()> {
        Ok(())
    }

    fn finish_action(&self, result: &ActionResult, counts: Counts) -> Result<()> {
        let progress = self.formatter.progress(counts) + result.action.display_text();
        let output = self.formatter.result(result);

        let mut writer = self.writer.lock();
        if !self.quiet {
            write_line(&mut *writer, &progress)?;
        }
        if !output.is_empty() {
            writer.write_all(output.as_bytes())?;
        }
        Ok(())
    }

    fn write_raw(&self, bytes: &[u8]) -> Result<usize> {
        self.writer.lock().write_all(bytes)?;
        Ok(bytes.len())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

impl<W: Write + Send> Write for &SimpleStatusOutput<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_raw(buf)?)
    }

    /// Formats first so concurrent writers cannot interleave inside one message.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.write_raw(args.to_string().as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.lock().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::StatusFormatter;

    fn output(quiet: bool) -> SimpleStatusOutput<Vec<u8>> {
        SimpleStatusOutput::new(Vec::new(), StatusFormatter::default(), quiet)
    }

    fn written(output: &SimpleStatusOutput<Vec<u8>>) -> String {
        output.with_writer(|buf| String::from_utf8(buf.clone()).unwrap())
    }

    fn counts(finished: usize, total: usize) -> Counts {
        Counts {
            total_actions: total,
            running_actions: 0,
            started_actions: finished,
            finished_actions: finished,
        }
    }

    #[test]
    fn only_print_and_above_are_shown() {
        let out = output(false);
        out.message(MsgLevel::Info, "hidden").unwrap();
        out.message(MsgLevel::Status, "hidden").unwrap();
        out.message(MsgLevel::Print, "shown").unwrap();
        out.message(MsgLevel::Error, "broken").unwrap();

        assert_eq!(written(&out), "shown\nFAILED: broken\n");
    }

    #[test]
    fn finished_actions_print_one_line_each() {
        let out = output(false);
        let action = Action::new("compiling foo.c", "cc -c foo.c");
        out.start_action(&action, counts(0, 2)).unwrap();
        out.finish_action(&ActionResult::success(action, ""), counts(1, 2))
            .unwrap();
        let action = Action::new("", "ld -o app");
        out.finish_action(&ActionResult::success(action, "note: relinked"), counts(2, 2))
            .unwrap();

        assert_eq!(
            written(&out),
            "[1/2] compiling foo.c\n[2/2] ld -o app\nnote: relinked\n"
        );
        assert!(!written(&out).contains('\x1b'));
    }

    #[test]
    fn quiet_output_keeps_failures() {
        let out = output(true);
        let ok = Action::new("compiling foo.c", "cc -c foo.c");
        out.finish_action(&ActionResult::success(ok, ""), counts(1, 2))
            .unwrap();
        let bad = Action::new("compiling bar.c", "cc -c bar.c").with_outputs(["bar.o"]);
        out.finish_action(
            &ActionResult::failure(bad, "bar.c:1: error", "exit 1"),
            counts(2, 2),
        )
        .unwrap();

        assert_eq!(written(&out), "FAILED: bar.o\ncc -c bar.c\nbar.c:1: error\n");
    }

    #[test]
    fn raw_writes_pass_through() {
        let out = output(false);
        let mut sink = &out;
        assert_eq!(sink.write(b"partial").unwrap(), 7);
        out.flush().unwrap();
        assert_eq!(out.into_inner(), b"partial");
    }

    #[test]
    fn formatted_writes_arrive_whole() {
        let out = output(false);
        let unused = std::hint::black_box(3);
        let mut sink = &out;
        writeln!(sink, "warning: {} unused", unused).unwrap();

        assert_eq!(written(&out), "warning: 3 unused\n");
    }
}
