//! Terminal resize notifications.
//!
//! [`ResizeWatcher`] owns a `SIGWINCH` subscription and a background thread that runs a
//! callback for every notification. The subscription lives exactly as long as the
//! watcher: [`ResizeWatcher::stop`] unregisters it and joins the thread, and later calls
//! are no-ops.

use crate::error::{Result, StatusError};
use std::thread::{self, JoinHandle};

#[cfg(unix)]
use signal_hook::{consts::SIGWINCH, iterator::Handle, iterator::Signals};

/// Name given to the background thread, visible in debuggers and panic messages.
const WATCHER_THREAD_NAME: &str = "statusline-resize";

/// Owned subscription to terminal resize notifications.
pub struct ResizeWatcher {
    #[cfg(unix)]
    handle: Option<Handle>,
    thread: Option<JoinHandle<()>>,
}

impl ResizeWatcher {
    /// Subscribe to resize notifications and run `on_resize` on a background thread for
    /// each one.
    #[cfg(unix)]
    pub fn start<F>(mut on_resize: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let mut signals = Signals::new([SIGWINCH])
            .map_err(|err| StatusError::signal("failed to subscribe to SIGWINCH", err))?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name(WATCHER_THREAD_NAME.to_string())
            .spawn(move || {
                for _ in signals.forever() {
                    on_resize();
                }
            });

        let thread = match thread {
            Ok(thread) => thread,
            Err(err) => {
                handle.close();
                return Err(StatusError::signal("failed to spawn resize watcher", err));
            }
        };

        log::debug!("resize watcher started");
        Ok(Self {
            handle: Some(handle),
            thread: Some(thread),
        })
    }

    /// Without a resize source the watcher is inert.
    #[cfg(not(unix))]
    pub fn start<F>(on_resize: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        drop(on_resize);
        Ok(Self { thread: None })
    }

    /// Whether the subscription is still active.
    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Unsubscribe and wait for the background thread to exit. Returns `false` when the
    /// watcher had already been stopped.
    pub fn stop(&mut self) -> bool {
        #[cfg(unix)]
        {
            if let Some(handle) = self.handle.take() {
                handle.close();
            }
        }

        match self.thread.take() {
            Some(thread) => {
                if thread.join().is_err() {
                    log::warn!("resize watcher thread panicked");
                }
                log::debug!("resize watcher stopped");
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ResizeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeWatcher")
            .field("running", &self.is_running())
            .finish()
    }
}

impl Drop for ResizeWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
