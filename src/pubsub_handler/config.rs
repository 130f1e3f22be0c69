//! Resolved configuration for [`PubsubHandler`](super::PubsubHandler).
//!
//! `PubsubHandlerBuilder` validates user input and produces this struct;
//! tests may also construct it directly.

use std::fmt;
use std::time::Duration;

use crate::buffer::BufferConfig;
use crate::formatter::SharedFormatter;
use crate::publisher::BatchPublisher;
use crate::pubsub::{SharedPublishFn, SharedTransport, default_publish_fn};
use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

/// Default number of client retries per publish call.
pub const DEFAULT_RETRY: u32 = 10;

#[derive(Clone)]
pub struct PubsubHandlerConfig {
    /// Fully qualified topic, `projects/{project}/topics/{topic}`.
    pub topic: String,
    pub client: SharedTransport,
    pub publish_fn: SharedPublishFn,
    /// Retries the client may make within one publish call.
    pub retry: u32,
    pub buffer: BufferConfig,
    pub formatter: SharedFormatter,
    /// Interval between rate-limited drop warnings.
    pub warn_interval: Duration,
}

impl PubsubHandlerConfig {
    /// Configuration with default buffering for `topic` over `client`.
    pub fn new(topic: impl Into<String>, client: SharedTransport) -> Self {
        Self {
            topic: topic.into(),
            client,
            publish_fn: default_publish_fn(),
            retry: DEFAULT_RETRY,
            buffer: BufferConfig::default(),
            formatter: SharedFormatter::default(),
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }

    pub(crate) fn publisher(&self) -> BatchPublisher {
        BatchPublisher::new(
            self.topic.clone(),
            self.client.clone(),
            self.publish_fn.clone(),
            self.retry,
            self.formatter.clone(),
        )
    }
}

impl fmt::Debug for PubsubHandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PubsubHandlerConfig")
            .field("topic", &self.topic)
            .field("retry", &self.retry)
            .field("buffer", &self.buffer)
            .field("formatter", &self.formatter)
            .field("warn_interval", &self.warn_interval)
            .finish_non_exhaustive()
    }
}
