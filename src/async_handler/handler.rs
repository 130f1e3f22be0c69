//! Public asynchronous handler type.

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::warn;
use parking_lot::{Mutex, RwLock};

use crate::{
    error::HandlerError,
    handler::PubsubHandlerTrait,
    handlers::HandlerBuildError,
    level::{Level, SharedLevel},
    log_record::LogEvent,
    rate_limited_warner::RateLimitedWarner,
};

use super::{
    config::AsyncHandlerConfig,
    worker::{WorkerCommand, WorkerContext, spawn_worker},
};

/// Handler dispatching events round-robin to a pool of workers.
///
/// Each worker owns an unbounded queue and a private buffer, so `emit` never
/// waits on the network. Events keep their order within one worker; there
/// is no ordering across workers.
pub struct AsyncPubsubHandler {
    topic: String,
    senders: RwLock<Vec<Sender<WorkerCommand>>>,
    handles: Mutex<Vec<thread::JoinHandle<()>>>,
    next: AtomicUsize,
    flush_level: SharedLevel,
    flush_timeout: Duration,
    warner: RateLimitedWarner,
}

impl AsyncPubsubHandler {
    /// Check the topic, then start `worker_num` workers.
    pub fn with_config(config: AsyncHandlerConfig) -> Result<Self, HandlerBuildError> {
        if config.worker_num == 0 {
            return Err(HandlerBuildError::InvalidConfig(
                "worker_num must be greater than zero".into(),
            ));
        }
        let publisher = config.handler.publisher();
        publisher.ensure_topic_exists()?;

        let flush_level = SharedLevel::new(config.handler.buffer.flush_level);
        let mut senders = Vec::with_capacity(config.worker_num);
        let mut handles = Vec::with_capacity(config.worker_num);
        for id in 0..config.worker_num {
            let ctx = WorkerContext {
                id,
                publisher: publisher.clone(),
                buffer: config.handler.buffer,
                flush_level: flush_level.clone(),
                side_channel: config.side_channel.clone(),
                shutdown_flush_attempts: config.shutdown_flush_attempts,
                warner: RateLimitedWarner::new(config.handler.warn_interval),
            };
            match spawn_worker(ctx) {
                Ok((tx, handle)) => {
                    senders.push(tx);
                    handles.push(handle);
                }
                Err(err) => {
                    shutdown_workers(senders, handles);
                    return Err(HandlerBuildError::Io(err));
                }
            }
        }

        Ok(Self {
            topic: config.handler.topic,
            senders: RwLock::new(senders),
            handles: Mutex::new(handles),
            next: AtomicUsize::new(0),
            flush_level,
            flush_timeout: config.flush_timeout,
            warner: RateLimitedWarner::new(config.handler.warn_interval),
        })
    }

    /// Queue `event` on the next worker.
    pub fn emit(&self, event: LogEvent) -> Result<(), HandlerError> {
        <Self as PubsubHandlerTrait>::emit(self, event)
    }

    /// Ask every worker to publish its buffer and wait for all of them.
    ///
    /// Fails with [`HandlerError::FlushTimeout`] when the acknowledgements do
    /// not arrive within the configured flush timeout.
    pub fn flush(&self) -> Result<(), HandlerError> {
        <Self as PubsubHandlerTrait>::flush(self)
    }

    /// Stop accepting events, let every worker drain and flush, then join
    /// them.
    ///
    /// Returns once every emitted event has been published or dropped and
    /// reported. Repeated calls are no-ops.
    pub fn close(&self) {
        let senders = std::mem::take(&mut *self.senders.write());
        let handles = std::mem::take(&mut *self.handles.lock());
        shutdown_workers(senders, handles);
        self.warner.flush(|count| {
            warn!("AsyncPubsubHandler dropped {count} events after close");
        });
    }

    pub fn is_closed(&self) -> bool {
        self.senders.read().is_empty()
    }

    /// Number of running workers; zero once closed.
    pub fn worker_num(&self) -> usize {
        self.senders.read().len()
    }

    pub fn flush_level(&self) -> Level {
        self.flush_level.get()
    }

    /// Change the flush level of every worker's buffer.
    pub fn set_flush_level(&self, level: Level) {
        self.flush_level.set(level);
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn reject_closed(&self) -> HandlerError {
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!("AsyncPubsubHandler dropped {count} events after close");
        });
        HandlerError::Closed
    }
}

fn shutdown_workers(senders: Vec<Sender<WorkerCommand>>, handles: Vec<thread::JoinHandle<()>>) {
    for tx in &senders {
        // A worker that already exited has nothing left to flush.
        let _ = tx.send(WorkerCommand::Shutdown);
    }
    drop(senders);
    for handle in handles {
        if handle.join().is_err() {
            warn!("AsyncPubsubHandler: worker thread panicked");
        }
    }
}

/// Wait for `pending` flush acknowledgements until `deadline`.
///
/// A worker that exits before acknowledging drops its ack sender, so a
/// disconnected channel means the pool closed under the flush.
pub(super) fn await_acks(
    ack_rx: &Receiver<()>,
    pending: usize,
    deadline: Instant,
) -> Result<(), HandlerError> {
    for _ in 0..pending {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match ack_rx.recv_timeout(remaining) {
            Ok(()) => {}
            Err(RecvTimeoutError::Timeout) => return Err(HandlerError::FlushTimeout),
            Err(RecvTimeoutError::Disconnected) => return Err(HandlerError::Closed),
        }
    }
    Ok(())
}

impl PubsubHandlerTrait for AsyncPubsubHandler {
    fn emit(&self, event: LogEvent) -> Result<(), HandlerError> {
        let senders = self.senders.read();
        if senders.is_empty() {
            drop(senders);
            return Err(self.reject_closed());
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % senders.len();
        senders[idx]
            .send(WorkerCommand::Event(event))
            .map_err(|_| HandlerError::Closed)
    }

    fn flush(&self) -> Result<(), HandlerError> {
        let deadline = Instant::now() + self.flush_timeout;
        let senders = self.senders.read().clone();
        if senders.is_empty() {
            return Err(HandlerError::Closed);
        }
        self.warner.flush(|count| {
            warn!("AsyncPubsubHandler dropped {count} events in the last interval");
        });
        let (ack_tx, ack_rx) = bounded(senders.len());
        let mut pending = 0;
        for tx in &senders {
            if tx.send(WorkerCommand::Flush(ack_tx.clone())).is_ok() {
                pending += 1;
            }
        }
        drop(ack_tx);
        await_acks(&ack_rx, pending, deadline)
    }
}

impl Drop for AsyncPubsubHandler {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for AsyncPubsubHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncPubsubHandler")
            .field("topic", &self.topic)
            .field("worker_num", &self.worker_num())
            .field("flush_timeout", &self.flush_timeout)
            .finish()
    }
}
