//! Asynchronous worker-pool handler.
//!
//! [`AsyncPubsubHandler`] hands each event to one of `worker_num` threads
//! in round-robin order. Every worker owns an unbounded queue and its own
//! buffer and applies the same flush policy as the synchronous handler.
//!
//! Publish failures are reported to the configured
//! [`SideChannel`](crate::side_channel::SideChannel) and never reach the
//! emitting thread:
//!
//! - **Recoverable**: the batch is restored and cut to the hard limit; the
//!   worker keeps going.
//! - **Fatal**: the batch is dropped; the worker keeps going.
//!
//! On shutdown each worker drains its queue and retries its final flush up
//! to `shutdown_flush_attempts` times before dropping what is left.

mod config;
mod handler;
mod worker;

#[cfg(test)]
mod tests;

pub use config::{
    AsyncHandlerConfig, DEFAULT_FLUSH_TIMEOUT, DEFAULT_SHUTDOWN_FLUSH_ATTEMPTS, DEFAULT_WORKER_NUM,
};
pub use handler::AsyncPubsubHandler;
pub use worker::WorkerCommand;
