//! Log event representation shipped by the handlers.
//!
//! A [`LogEvent`] captures one logging call along with its contextual
//! metadata such as timestamp, source location and thread information. The
//! handlers never mutate events; they are buffered, formatted into a publish
//! payload, and dropped once the batch they belong to resolves.

use std::collections::BTreeMap;
use std::fmt;
use std::thread::{self, ThreadId};
use std::time::SystemTime;

use crate::level::Level;

/// Additional context associated with a log event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordMetadata {
    /// Rust module path where the log call originated.
    pub module_path: String,
    /// Source file name for the log call.
    pub filename: String,
    /// Line number in the source file.
    pub line_number: u32,
    /// Time the event was created.
    pub timestamp: SystemTime,
    /// ID of the thread that created the event.
    pub thread_id: ThreadId,
    /// Name of the thread that created the event (if any).
    pub thread_name: Option<String>,
    /// Structured key-value pairs attached to the event.
    pub key_values: BTreeMap<String, String>,
}

impl RecordMetadata {
    fn capture_runtime() -> (SystemTime, ThreadId, Option<String>) {
        let current = thread::current();
        (
            SystemTime::now(),
            current.id(),
            current.name().map(ToString::to_string),
        )
    }
}

impl Default for RecordMetadata {
    fn default() -> Self {
        let (timestamp, thread_id, thread_name) = Self::capture_runtime();
        Self {
            module_path: String::new(),
            filename: String::new(),
            line_number: 0,
            timestamp,
            thread_id,
            thread_name,
            key_values: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEvent {
    logger: String,
    level: Level,
    message: String,
    metadata: RecordMetadata,
}

impl LogEvent {
    /// Construct a new event from logger `name`, `level`, and `message`.
    pub fn new(logger: &str, level: Level, message: &str) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata: RecordMetadata::default(),
        }
    }

    /// Construct an event with explicit source location and key-values.
    ///
    /// Timestamp and thread information are always taken from the calling
    /// context, overriding whatever `metadata` carried.
    pub fn with_metadata(
        logger: &str,
        level: Level,
        message: &str,
        mut metadata: RecordMetadata,
    ) -> Self {
        let (timestamp, thread_id, thread_name) = RecordMetadata::capture_runtime();
        metadata.timestamp = timestamp;
        metadata.thread_id = thread_id;
        metadata.thread_name = thread_name;
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata,
        }
    }

    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn level_str(&self) -> &'static str {
        self.level.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}
