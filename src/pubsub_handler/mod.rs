//! Synchronous buffering handler.
//!
//! [`PubsubHandler`] keeps emitted events in memory and publishes them as one
//! request when the buffer reaches capacity or an event at or above the
//! flush level arrives. The publish runs inline on the emitting thread; that
//! is the only place the handler blocks.
//!
//! # Failure handling
//!
//! - **Recoverable** (429, 5xx, explicit recoverable errors): the batch goes
//!   back in front of the buffer, the oldest events beyond the hard limit
//!   are dropped, and the caller sees `Ok`.
//! - **Fatal** (everything else): the error is returned from `flush` (and
//!   from the `emit` that triggered it). The batch is not kept.

mod config;
mod handler;


pub use config::{DEFAULT_RETRY, PubsubHandlerConfig};
pub use handler::PubsubHandler;
