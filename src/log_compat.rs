//! Compatibility bridge for the Rust `log` crate.
//!
//! [`PubsubLogAdapter`] implements `log::Log` and forwards every record to a
//! Pub/Sub handler, so existing `log::info!` call sites ship to a topic
//! without changes. Records emitted by this crate and by its HTTP stack are
//! ignored; publishing them would feed the handler its own diagnostics.

use std::borrow::Cow;
use std::sync::Arc;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::error::HandlerError;
use crate::handler::PubsubHandlerTrait;
use crate::level::Level;
use crate::log_record::{LogEvent, RecordMetadata};

/// Target prefixes never forwarded to the handler.
const IGNORED_TARGETS: &[&str] = &["pubsub_logging", "ureq", "native_tls", "rustls"];

/// Adapter implementing the Rust `log::Log` trait.
pub struct PubsubLogAdapter {
    handler: Arc<dyn PubsubHandlerTrait>,
    max_level: LevelFilter,
}

impl PubsubLogAdapter {
    /// Forward records at every level to `handler`.
    pub fn new(handler: Arc<dyn PubsubHandlerTrait>) -> Self {
        Self {
            handler,
            max_level: LevelFilter::Trace,
        }
    }

    /// Only forward records at or above `max_level`.
    pub fn with_max_level(mut self, max_level: LevelFilter) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }
}

fn is_internal_target(target: &str) -> bool {
    IGNORED_TARGETS.iter().any(|prefix| {
        target
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

fn normalise_target(target: &str) -> Cow<'_, str> {
    if target.contains("::") {
        Cow::Owned(target.replace("::", "."))
    } else {
        Cow::Borrowed(target)
    }
}

impl log::Log for PubsubLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level && !is_internal_target(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let metadata = RecordMetadata {
            module_path: record.module_path().unwrap_or_default().to_string(),
            filename: record.file().unwrap_or_default().to_string(),
            line_number: record.line().unwrap_or(0),
            ..Default::default()
        };
        let event = LogEvent::with_metadata(
            &normalise_target(record.target()),
            Level::from(record.level()),
            &record.args().to_string(),
            metadata,
        );

        match self.handler.emit(event) {
            Ok(()) | Err(HandlerError::Closed) => {}
            Err(err) => eprintln!("pubsub_logging: failed to ship log record: {err}"),
        }
    }

    fn flush(&self) {
        if let Err(err) = self.handler.flush() {
            eprintln!("pubsub_logging: flush failed: {err}");
        }
    }
}

/// Install `handler` as the global Rust logger.
///
/// Fails when a different global logger is already set. The `log` crate's
/// global max level is raised to `max_level`.
pub fn install_global_logger(
    handler: Arc<dyn PubsubHandlerTrait>,
    max_level: LevelFilter,
) -> Result<(), SetLoggerError> {
    let adapter = PubsubLogAdapter::new(handler).with_max_level(max_level);
    log::set_boxed_logger(Box::new(adapter))?;
    log::set_max_level(max_level);
    Ok(())
}
