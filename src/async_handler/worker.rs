//! Worker threads owning one buffer each.
//!
//! A worker blocks on its queue, appends events to its private buffer and
//! publishes according to the shared flush policy. Failures never leave the
//! worker: they are written to the side channel and the loop continues.

use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

use crate::{
    buffer::{BufferConfig, EventBuffer},
    error::PublishOutcome,
    level::SharedLevel,
    log_record::LogEvent,
    publisher::BatchPublisher,
    rate_limited_warner::RateLimitedWarner,
    side_channel::SharedSideChannel,
};

/// Commands processed by a worker thread.
#[derive(Debug)]
pub enum WorkerCommand {
    Event(LogEvent),
    Flush(Sender<()>),
    Shutdown,
}

/// Everything a worker needs besides its queue.
pub(crate) struct WorkerContext {
    pub(crate) id: usize,
    pub(crate) publisher: BatchPublisher,
    pub(crate) buffer: BufferConfig,
    pub(crate) flush_level: SharedLevel,
    pub(crate) side_channel: SharedSideChannel,
    pub(crate) shutdown_flush_attempts: u32,
    pub(crate) warner: RateLimitedWarner,
}

/// Spawn one worker with its own unbounded queue.
pub(crate) fn spawn_worker(
    ctx: WorkerContext,
) -> std::io::Result<(Sender<WorkerCommand>, thread::JoinHandle<()>)> {
    let (tx, rx) = unbounded();
    let handle = thread::Builder::new()
        .name(format!("pubsub-worker-{}", ctx.id))
        .spawn(move || Worker::new(ctx).run(rx))?;
    Ok((tx, handle))
}

struct Worker {
    ctx: WorkerContext,
    buffer: EventBuffer,
}

impl Worker {
    fn new(ctx: WorkerContext) -> Self {
        let buffer = EventBuffer::from_config(&ctx.buffer, ctx.flush_level.clone());
        Self { ctx, buffer }
    }

    fn run(mut self, rx: Receiver<WorkerCommand>) {
        loop {
            match rx.recv() {
                Ok(WorkerCommand::Event(event)) => self.handle_event(event),
                Ok(WorkerCommand::Flush(ack)) => self.handle_flush_command(ack),
                Ok(WorkerCommand::Shutdown) | Err(_) => {
                    self.drain_pending(&rx);
                    self.final_flush();
                    break;
                }
            }
        }
    }

    fn handle_event(&mut self, event: LogEvent) {
        if self.buffer.append(event) {
            self.flush();
        }
    }

    fn handle_flush_command(&mut self, ack: Sender<()>) {
        self.flush();
        // The requester may have timed out already.
        let _ = ack.send(());
    }

    fn drain_pending(&mut self, rx: &Receiver<WorkerCommand>) {
        loop {
            match rx.try_recv() {
                Ok(WorkerCommand::Event(event)) => self.handle_event(event),
                Ok(WorkerCommand::Flush(ack)) => self.handle_flush_command(ack),
                Ok(WorkerCommand::Shutdown) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Publish the buffer once. Returns whether the buffer is now empty.
    fn flush(&mut self) -> bool {
        let batch = self.buffer.snapshot_and_clear();
        if batch.is_empty() {
            return true;
        }
        let size = batch.len();
        match self.ctx.publisher.publish(&batch) {
            PublishOutcome::Success => {}
            PublishOutcome::RecoverableFailure(err) => {
                self.report(&format!(
                    "recoverable failure publishing {size} events to {}: {err}",
                    self.ctx.publisher.topic()
                ));
                let dropped = self.buffer.restore_on_recoverable(batch);
                self.record_drops(dropped, "buffer over hard limit");
            }
            PublishOutcome::FatalFailure(err) => {
                self.report(&format!(
                    "dropping {size} events after fatal failure publishing to {}: {err}",
                    self.ctx.publisher.topic()
                ));
            }
        }
        self.buffer.is_empty()
    }

    fn final_flush(&mut self) {
        let mut attempts = 0;
        while attempts < self.ctx.shutdown_flush_attempts.max(1) {
            attempts += 1;
            if self.flush() {
                break;
            }
        }
        let remaining = self.buffer.len();
        if remaining > 0 {
            self.buffer.snapshot_and_clear();
            self.report(&format!(
                "dropping {remaining} events still unpublished after {attempts} shutdown flush attempts"
            ));
        }
        self.ctx.warner.flush(|count| {
            self.ctx
                .side_channel
                .report(&format!("worker {} dropped {count} events", self.ctx.id));
        });
    }

    fn record_drops(&self, dropped: usize, reason: &str) {
        if dropped == 0 {
            return;
        }
        self.ctx.warner.record_drops(dropped as u64);
        self.ctx.warner.warn_if_due(|count| {
            self.ctx.side_channel.report(&format!(
                "worker {} dropped {count} events: {reason}",
                self.ctx.id
            ));
        });
    }

    fn report(&self, message: &str) {
        self.ctx
            .side_channel
            .report(&format!("worker {}: {message}", self.ctx.id));
    }
}
