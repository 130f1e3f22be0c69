//! Pending-event buffer and the batches cut from it.
//!
//! An [`EventBuffer`] is owned by exactly one handler (synchronous variant)
//! or one worker (asynchronous variant), so none of its operations need to
//! be atomic with respect to other threads. Its length stays within the
//! flush policy's capacity, except between an append and the flush that
//! append triggers. A separate hard limit bounds memory while the backend
//! keeps failing: after a failed flush the oldest events beyond the limit
//! are discarded.

mod policy;

use std::collections::VecDeque;

use crate::formatter::SharedFormatter;
use crate::level::{Level, SharedLevel};
use crate::log_record::LogEvent;
use crate::pubsub::{PublishBody, encode};

pub use policy::FlushPolicy;

/// Default number of buffered events that triggers a flush.
pub const DEFAULT_CAPACITY: usize = 1000;
/// Default number of events retained across failed flushes.
pub const DEFAULT_BUF_HARD_LIMIT: usize = 10_000;
/// Default severity that forces an immediate flush.
pub const DEFAULT_FLUSH_LEVEL: Level = Level::Critical;

/// Static buffer settings shared by every buffer a handler creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferConfig {
    /// Number of buffered events that triggers a flush.
    pub capacity: usize,
    /// Maximum number of events kept after a recoverable failure.
    pub hard_limit: usize,
    /// Events at or above this level flush immediately.
    pub flush_level: Level,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            hard_limit: DEFAULT_BUF_HARD_LIMIT,
            flush_level: DEFAULT_FLUSH_LEVEL,
        }
    }
}

/// Ordered sequence of events awaiting publish.
#[derive(Debug)]
pub struct EventBuffer {
    events: VecDeque<LogEvent>,
    policy: FlushPolicy,
    hard_limit: usize,
}

impl EventBuffer {
    pub fn new(policy: FlushPolicy, hard_limit: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(policy.capacity()),
            policy,
            hard_limit,
        }
    }

    /// Build a buffer whose flush level is read from `flush_level`.
    pub fn from_config(config: &BufferConfig, flush_level: SharedLevel) -> Self {
        Self::new(
            FlushPolicy::new(config.capacity, flush_level),
            config.hard_limit,
        )
    }

    /// Append `event` and report whether a flush is now required.
    pub fn append(&mut self, event: LogEvent) -> bool {
        let level = event.level();
        self.events.push_back(event);
        self.policy.should_flush(level, self.events.len())
    }

    /// Take every buffered event as a batch, leaving the buffer empty.
    pub fn snapshot_and_clear(&mut self) -> Batch {
        Batch {
            events: self.events.drain(..).collect(),
        }
    }

    /// Put a failed batch back in front of anything appended since it was
    /// cut, then enforce the hard limit.
    ///
    /// Returns the number of events discarded by the hard-limit cut.
    pub fn restore_on_recoverable(&mut self, batch: Batch) -> usize {
        for event in batch.events.into_iter().rev() {
            self.events.push_front(event);
        }
        self.cut_on_overflow()
    }

    /// Discard the oldest events until the buffer is within the hard limit.
    ///
    /// Only called after a failed flush. Returns the number of events
    /// discarded.
    pub fn cut_on_overflow(&mut self) -> usize {
        let excess = self.events.len().saturating_sub(self.hard_limit);
        self.events.drain(..excess);
        excess
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn hard_limit(&self) -> usize {
        self.hard_limit
    }

    pub fn set_hard_limit(&mut self, hard_limit: usize) {
        self.hard_limit = hard_limit;
    }

    /// Iterate over buffered events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter()
    }
}

/// Immutable snapshot of a buffer taken at flush time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Batch {
    events: Vec<LogEvent>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    /// Format and encode every event into one publish request body.
    pub fn to_body(&self, formatter: &SharedFormatter) -> PublishBody {
        PublishBody::from_payloads(
            self.events
                .iter()
                .map(|event| encode(&formatter.format(event))),
        )
    }
}

impl From<Vec<LogEvent>> for Batch {
    fn from(events: Vec<LogEvent>) -> Self {
        Self { events }
    }
}
