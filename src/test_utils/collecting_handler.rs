//! A handler that accumulates events in memory for test assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::HandlerError;
use crate::handler::PubsubHandlerTrait;
use crate::log_record::LogEvent;

/// Handler that stores every event it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingHandler {
    events: Arc<Mutex<Vec<LogEvent>>>,
    flushes: Arc<Mutex<usize>>,
}

impl CollectingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all events received so far.
    pub fn collected(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }

    pub fn flush_count(&self) -> usize {
        *self.flushes.lock()
    }
}

impl PubsubHandlerTrait for CollectingHandler {
    fn emit(&self, event: LogEvent) -> Result<(), HandlerError> {
        self.events.lock().push(event);
        Ok(())
    }

    fn flush(&self) -> Result<(), HandlerError> {
        *self.flushes.lock() += 1;
        Ok(())
    }
}
