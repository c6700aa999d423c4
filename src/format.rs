//! Turning status events into display strings.
//!
//! Progress prefixes are produced from a small template language modelled on ninja's
//! `NINJA_STATUS` variable:
//!
//! | placeholder | meaning                                   |
//! |-------------|-------------------------------------------|
//! | `%s`        | started actions                           |
//! | `%t`        | total actions                             |
//! | `%r`        | running actions                           |
//! | `%u`        | unstarted actions                         |
//! | `%f`        | finished actions                          |
//! | `%p`        | percentage of finished actions (`{:3}%`)  |
//! | `%%`        | a literal `%`                             |
//!
//! Unknown sequences are copied through unchanged.

use crate::status::{ActionResult, Counts, MsgLevel};

/// Default progress template, rendering e.g. `[42/100] `.
pub const DEFAULT_STATUS_FORMAT: &str = "[%f/%t] ";

/// Converts status events into the strings an output prints.
pub trait Formatter: Send + Sync {
    /// Display string for a free-form message
    fn message(&self, level: MsgLevel, message: &str) -> String;

    /// Progress prefix for the given counts, e.g. `[3/10] `
    fn progress(&self, counts: Counts) -> String;

    /// Auxiliary output for a finished action; empty when there is nothing to show
    fn result(&self, result: &ActionResult) -> String;
}

/// Template-driven formatter used by both the smart and the simple outputs.
#[derive(Debug, Clone)]
pub struct StatusFormatter {
    format: String,
    quiet: bool,
}

impl Default for StatusFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_FORMAT, false)
    }
}

impl StatusFormatter {
    /// Create a formatter from a progress template. An empty template falls back to the
    /// default one.
    pub fn new(format: impl Into<String>, quiet: bool) -> Self {
        let format = format.into();
        let format = if format.is_empty() {
            DEFAULT_STATUS_FORMAT.to_string()
        } else {
            format
        };
        Self { format, quiet }
    }
}

impl Formatter for StatusFormatter {
    fn message(&self, level: MsgLevel, message: &str) -> String {
        match level {
            MsgLevel::Error => format!("FAILED: {}", message),
            MsgLevel::Print | MsgLevel::Status => message.to_string(),
            _ => format!("{}{}", level.prefix(), message),
        }
    }

    fn progress(&self, counts: Counts) -> String {
        let mut out = String::with_capacity(self.format.len() + 8);
        let mut chars = self.format.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }

            match chars.next() {
                Some('s') => out.push_str(&counts.started_actions.to_string()),
                Some('t') => out.push_str(&counts.total_actions.to_string()),
                Some('r') => out.push_str(&counts.running_actions.to_string()),
                Some('u') => out.push_str(&counts.unstarted_actions().to_string()),
                Some('f') => out.push_str(&counts.finished_actions.to_string()),
                Some('p') => out.push_str(&format!("{:3}%", counts.percent_finished())),
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }

        out
    }

    fn result(&self, result: &ActionResult) -> String {
        let mut ret = if result.is_failure() {
            let targets = result.action.outputs.join(" ");
            if self.quiet || result.action.command.is_empty() {
                format!("FAILED: {}\n{}", targets, result.output)
            } else {
                format!(
                    "FAILED: {}\n{}\n{}",
                    targets, result.action.command, result.output
                )
            }
        } else {
            result.output.clone()
        };

        if !ret.is_empty() && !ret.ends_with('\n') {
            ret.push('\n');
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Action;

    fn counts(total: usize, running: usize, started: usize, finished: usize) -> Counts {
        Counts {
            total_actions: total,
            running_actions: running,
            started_actions: started,
            finished_actions: finished,
        }
    }

    #[test]
    fn default_progress_template() {
        let formatter = StatusFormatter::default();
        assert_eq!(formatter.progress(counts(100, 4, 46, 42)), "[42/100] ");
    }

    #[test]
    fn every_placeholder_expands() {
        let formatter = StatusFormatter::new("%s|%t|%r|%u|%f|%p|%%", false);
        assert_eq!(
            formatter.progress(counts(10, 2, 6, 4)),
            "6|10|2|4|4| 40%|%"
        );
    }

    #[test]
    fn unknown_and_trailing_percent_are_literal() {
        let formatter = StatusFormatter::new("%x [%f] %", false);
        assert_eq!(formatter.progress(counts(3, 0, 1, 1)), "%x [1] %");
    }

    #[test]
    fn empty_template_uses_default() {
        let formatter = StatusFormatter::new("", true);
        assert_eq!(formatter.progress(counts(3, 0, 1, 1)), "[1/3] ");

        let failed = ActionResult::failure(
            Action::new("linking app", "ld -o app").with_outputs(["app"]),
            "undefined symbol",
            "exit 1",
        );
        assert_eq!(formatter.result(&failed), "FAILED: app\nundefined symbol\n");
    }

    #[test]
    fn message_prefixes_by_level() {
        let formatter = StatusFormatter::default();
        assert_eq!(formatter.message(MsgLevel::Error, "boom"), "FAILED: boom");
        assert_eq!(formatter.message(MsgLevel::Print, "hello"), "hello");
        assert_eq!(formatter.message(MsgLevel::Status, "working"), "working");
        assert_eq!(formatter.message(MsgLevel::Info, "note"), "info: note");
    }

    #[test]
    fn successful_result_is_output_with_newline() {
        let formatter = StatusFormatter::default();
        let action = Action::new("compiling foo.c", "cc -c foo.c");

        let silent = ActionResult::success(action.clone(), "");
        assert_eq!(formatter.result(&silent), "");

        let warned = ActionResult::success(action, "foo.c:1: warning: unused");
        assert_eq!(formatter.result(&warned), "foo.c:1: warning: unused\n");
    }

    #[test]
    fn failed_result_names_outputs_and_command() {
        let action = Action::new("compiling foo.c", "cc -c foo.c").with_outputs(["foo.o"]);
        let failed = ActionResult::failure(action, "foo.c:3: error: expected ';'\n", "exit 1");

        let verbose = StatusFormatter::default();
        assert_eq!(
            verbose.result(&failed),
            "FAILED: foo.o\ncc -c foo.c\nfoo.c:3: error: expected ';'\n"
        );

        let quiet = StatusFormatter::new(DEFAULT_STATUS_FORMAT, true);
        assert_eq!(
            quiet.result(&failed),
            "FAILED: foo.o\nfoo.c:3: error: expected ';'\n"
        );
    }
}
