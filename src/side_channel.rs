//! Out-of-band reporting for failures inside background workers.
//!
//! A worker cannot return errors to whoever emitted the events it is
//! publishing, and it must not log them through the sink that is failing.
//! Failures are therefore written to a [`SideChannel`], standard error by
//! default.

use std::io::Write;
use std::sync::Arc;

/// Destination for worker failure reports.
pub trait SideChannel: Send + Sync {
    fn report(&self, message: &str);
}

pub type SharedSideChannel = Arc<dyn SideChannel>;

/// Writes each report as one line on standard error.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrSideChannel;

impl SideChannel for StderrSideChannel {
    fn report(&self, message: &str) {
        let stderr = std::io::stderr();
        let mut lock = stderr.lock();
        let _ = writeln!(lock, "pubsub_logging: {message}");
    }
}

/// Forwards reports to the `log` facade at warn level.
///
/// Only safe when the installed logger is not itself shipping to Pub/Sub;
/// [`PubsubLogAdapter`](crate::PubsubLogAdapter) ignores this crate's target
/// for that reason.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSideChannel;

impl SideChannel for LogSideChannel {
    fn report(&self, message: &str) {
        log::warn!(target: "pubsub_logging::worker", "{message}");
    }
}

/// Discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSideChannel;

impl SideChannel for NullSideChannel {
    fn report(&self, _message: &str) {}
}

pub fn default_side_channel() -> SharedSideChannel {
    Arc::new(StderrSideChannel)
}
