//! Public handler type exported by the crate.

use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;
use parking_lot::Mutex;

use crate::{
    buffer::EventBuffer,
    error::{HandlerError, PublishOutcome},
    handler::PubsubHandlerTrait,
    handlers::HandlerBuildError,
    level::{Level, SharedLevel},
    log_record::LogEvent,
    publisher::BatchPublisher,
    rate_limited_warner::RateLimitedWarner,
};

use super::config::PubsubHandlerConfig;

/// Handler buffering events and publishing them inline.
///
/// The buffer sits behind a mutex only so the handler can be shared between
/// threads. A second lock serialises flushes: events emitted by other
/// threads while a publish is in flight are appended normally and end up
/// behind any batch restored after a recoverable failure.
pub struct PubsubHandler {
    publisher: BatchPublisher,
    buffer: Mutex<EventBuffer>,
    flush_lock: Mutex<()>,
    flush_level: SharedLevel,
    closed: AtomicBool,
    warner: RateLimitedWarner,
}

impl PubsubHandler {
    /// Construct the handler from a configuration object.
    ///
    /// Fails with [`HandlerBuildError::TopicNotFound`] when the topic does
    /// not exist; nothing is buffered or published in that case.
    pub fn with_config(config: PubsubHandlerConfig) -> Result<Self, HandlerBuildError> {
        let publisher = config.publisher();
        publisher.ensure_topic_exists()?;
        let flush_level = SharedLevel::new(config.buffer.flush_level);
        let buffer = EventBuffer::from_config(&config.buffer, flush_level.clone());
        Ok(Self {
            publisher,
            buffer: Mutex::new(buffer),
            flush_lock: Mutex::new(()),
            flush_level,
            closed: AtomicBool::new(false),
            warner: RateLimitedWarner::new(config.warn_interval),
        })
    }

    /// Buffer `event`, flushing inline when the policy fires.
    pub fn emit(&self, event: LogEvent) -> Result<(), HandlerError> {
        <Self as PubsubHandlerTrait>::emit(self, event)
    }

    /// Publish everything buffered as one request.
    ///
    /// Recoverable failures are absorbed and the events stay buffered.
    /// Fatal failures are returned and the detached batch is lost.
    pub fn flush(&self) -> Result<(), HandlerError> {
        <Self as PubsubHandlerTrait>::flush(self)
    }

    /// Flush and stop accepting events. Repeated calls are no-ops.
    pub fn close(&self) -> Result<(), HandlerError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let result = self.flush_buffer();
        self.warner.flush(|count| {
            warn!("PubsubHandler dropped {count} events before close");
        });
        result
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Copy of the buffered events, oldest first.
    pub fn buffered_events(&self) -> Vec<LogEvent> {
        self.buffer.lock().iter().cloned().collect()
    }

    pub fn flush_level(&self) -> Level {
        self.flush_level.get()
    }

    /// Change the level that forces an immediate flush.
    pub fn set_flush_level(&self, level: Level) {
        self.flush_level.set(level);
    }

    pub fn buf_hard_limit(&self) -> usize {
        self.buffer.lock().hard_limit()
    }

    /// Change how many events survive a failed flush. Takes effect on the
    /// next failure.
    pub fn set_buf_hard_limit(&self, hard_limit: usize) {
        self.buffer.lock().set_hard_limit(hard_limit);
    }

    pub fn topic(&self) -> &str {
        self.publisher.topic()
    }

    fn flush_buffer(&self) -> Result<(), HandlerError> {
        let _flushing = self.flush_lock.lock();
        let batch = self.buffer.lock().snapshot_and_clear();
        if batch.is_empty() {
            return Ok(());
        }
        match self.publisher.publish(&batch) {
            PublishOutcome::Success => Ok(()),
            PublishOutcome::RecoverableFailure(err) => {
                let size = batch.len();
                let dropped = self.buffer.lock().restore_on_recoverable(batch);
                warn!(
                    "PubsubHandler could not publish {size} events to {}: {err}; keeping them for the next flush",
                    self.publisher.topic()
                );
                if dropped > 0 {
                    self.warner.record_drops(dropped as u64);
                    self.warner.warn_if_due(|count| {
                        warn!("PubsubHandler buffer over hard limit; dropped {count} oldest events");
                    });
                }
                Ok(())
            }
            PublishOutcome::FatalFailure(err) => Err(HandlerError::Publish(err)),
        }
    }
}

impl PubsubHandlerTrait for PubsubHandler {
    fn emit(&self, event: LogEvent) -> Result<(), HandlerError> {
        if self.is_closed() {
            self.warner.record_drop();
            self.warner.warn_if_due(|count| {
                warn!("PubsubHandler dropped {count} events after close");
            });
            return Err(HandlerError::Closed);
        }
        let flush_now = self.buffer.lock().append(event);
        if flush_now {
            self.flush_buffer()
        } else {
            Ok(())
        }
    }

    fn flush(&self) -> Result<(), HandlerError> {
        self.flush_buffer()
    }
}

impl Drop for PubsubHandler {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("PubsubHandler lost buffered events on drop: {err}");
        }
    }
}

impl std::fmt::Debug for PubsubHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubsubHandler")
            .field("topic", &self.publisher.topic())
            .field("flush_level", &self.flush_level.get())
            .field("closed", &self.is_closed())
            .finish()
    }
}
