//! Picking the right status output for a sink.

use crate::config::StatusConfig;
use crate::error::Result;
use crate::format::StatusFormatter;
use crate::simple::SimpleStatusOutput;
use crate::smart::SmartStatusOutput;
use crate::status::StatusOutput;
use crate::terminal::{self, WidthProbe};
use std::io::Write;
use std::sync::Arc;

/// Build a [`StatusOutput`] for `writer`.
///
/// Interactive terminals get the in-place status line; pipes, files, `TERM=dumb` and
/// `force_dumb` configurations get line-oriented output.
pub fn new_status_output<W, P>(
    writer: W,
    probe: P,
    config: &StatusConfig,
) -> Result<Box<dyn StatusOutput>>
where
    W: Write + Send + 'static,
    P: WidthProbe + 'static,
{
    let formatter = StatusFormatter::new(config.status_format.clone(), config.quiet);

    if !config.force_dumb && terminal::is_smart_terminal(&probe) {
        log::debug!("using smart status output");
        let output = SmartStatusOutput::build(writer, Box::new(formatter), Arc::new(probe), None)?;
        Ok(Box::new(output))
    } else {
        log::debug!("using simple status output");
        Ok(Box::new(SimpleStatusOutput::build(
            writer,
            Box::new(formatter),
            config.quiet,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{Action, ActionResult, Counts};
    use crate::terminal::FixedWidth;
    use parking_lot::Mutex;
    use std::io;

    /// Sink whose contents remain readable after it has been boxed away.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn finish_one(output: &dyn StatusOutput) {
        let result = ActionResult::success(Action::new("compiling foo.c", "cc"), "");
        let counts = Counts {
            total_actions: 1,
            running_actions: 0,
            started_actions: 1,
            finished_actions: 1,
        };
        output.finish_action(&result, counts).unwrap();
        output.flush().unwrap();
    }

    #[test]
    fn non_terminal_sink_gets_simple_output() {
        let buffer = SharedBuffer::default();
        let output =
            new_status_output(buffer.clone(), FixedWidth(None), &StatusConfig::default()).unwrap();
        finish_one(output.as_ref());

        assert_eq!(buffer.contents(), "[1/1] compiling foo.c\n");
    }

    #[test]
    fn force_dumb_overrides_terminal() {
        let buffer = SharedBuffer::default();
        let config = StatusConfig {
            force_dumb: true,
            ..StatusConfig::default()
        };
        let output = new_status_output(buffer.clone(), FixedWidth(Some(80)), &config).unwrap();
        finish_one(output.as_ref());

        assert!(!buffer.contents().contains('\x1b'));
    }

    #[test]
    fn configured_template_is_used() {
        let buffer = SharedBuffer::default();
        let config = StatusConfig {
            status_format: "(%f of %t) ".to_string(),
            force_dumb: true,
            ..StatusConfig::default()
        };
        let output = new_status_output(buffer.clone(), FixedWidth(None), &config).unwrap();
        finish_one(output.as_ref());

        assert_eq!(buffer.contents(), "(1 of 1) compiling foo.c\n");
    }
}
