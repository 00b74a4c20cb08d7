// Log output that doesn't tear the progress bar

use indicatif::ProgressBar;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Route log lines above `pb` until [`detach_progress_bar`] is called.
pub fn attach_progress_bar(pb: &ProgressBar) {
    if let Ok(mut slot) = ACTIVE_BAR.lock() {
        *slot = Some(pb.clone());
    }
}

pub fn detach_progress_bar() {
    if let Ok(mut slot) = ACTIVE_BAR.lock() {
        *slot = None;
    }
}

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR.lock().ok().and_then(|slot| slot.clone())
}

/// Stderr writer that suspends the attached progress bar while a log line
/// is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressAwareStderr;

impl<'a> MakeWriter<'a> for ProgressAwareStderr {
    type Writer = ProgressAwareStderr;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}

impl Write for ProgressAwareStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Clone out of the lock so suspend never runs while holding it
        match active_bar() {
            Some(pb) => pb.suspend(|| io::stderr().write_all(buf))?,
            None => io::stderr().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `warn` when quiet.
pub fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ProgressAwareStderr)
        .init();
}
