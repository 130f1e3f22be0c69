//! Configuration consumed by [`AsyncPubsubHandler`](super::AsyncPubsubHandler).

use std::fmt;
use std::time::Duration;

use crate::pubsub::SharedTransport;
use crate::pubsub_handler::PubsubHandlerConfig;
use crate::side_channel::{SharedSideChannel, default_side_channel};

/// Default number of worker threads.
pub const DEFAULT_WORKER_NUM: usize = 4;
/// Default time `flush` waits for every worker to acknowledge.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(30);
/// Default number of final flush attempts a worker makes on shutdown.
pub const DEFAULT_SHUTDOWN_FLUSH_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct AsyncHandlerConfig {
    /// Topic, client, strategy, buffering and formatting shared with the
    /// synchronous handler. Each worker gets its own buffer built from
    /// `handler.buffer`.
    pub handler: PubsubHandlerConfig,
    pub worker_num: usize,
    /// Where workers report publish failures.
    pub side_channel: SharedSideChannel,
    pub flush_timeout: Duration,
    pub shutdown_flush_attempts: u32,
}

impl AsyncHandlerConfig {
    pub fn new(topic: impl Into<String>, client: SharedTransport) -> Self {
        Self {
            handler: PubsubHandlerConfig::new(topic, client),
            worker_num: DEFAULT_WORKER_NUM,
            side_channel: default_side_channel(),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            shutdown_flush_attempts: DEFAULT_SHUTDOWN_FLUSH_ATTEMPTS,
        }
    }
}

impl fmt::Debug for AsyncHandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncHandlerConfig")
            .field("handler", &self.handler)
            .field("worker_num", &self.worker_num)
            .field("flush_timeout", &self.flush_timeout)
            .field("shutdown_flush_attempts", &self.shutdown_flush_attempts)
            .finish_non_exhaustive()
    }
}
