//! Formatters turning [`LogEvent`] values into the text that gets encoded
//! and published.
//!
//! [`DefaultFormatter`] publishes the bare message. [`PatternFormatter`]
//! expands `{field}` placeholders, and any `Send + Sync` type implementing
//! [`EventFormatter`] can be installed through [`SharedFormatter`].

use std::{fmt, sync::Arc};

use crate::log_record::LogEvent;

mod pattern;

pub use pattern::PatternFormatter;

/// Trait for formatting log events into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so a single formatter
/// can be shared by every worker of an asynchronous handler.
pub trait EventFormatter: Send + Sync {
    /// Format a log event into a string representation.
    fn format(&self, event: &LogEvent) -> String;
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn EventFormatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: EventFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Format an event using the wrapped formatter instance.
    pub fn format(&self, event: &LogEvent) -> String {
        self.inner.format(event)
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(DefaultFormatter)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn EventFormatter>)")
    }
}

/// Publishes the message text unchanged.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFormatter;

impl EventFormatter for DefaultFormatter {
    fn format(&self, event: &LogEvent) -> String {
        event.message().to_owned()
    }
}

impl<F> EventFormatter for F
where
    F: Fn(&LogEvent) -> String + Send + Sync,
{
    fn format(&self, event: &LogEvent) -> String {
        self(event)
    }
}
