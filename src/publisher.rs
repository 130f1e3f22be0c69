//! Glue between a buffer's batches and the publish strategy.
//!
//! [`BatchPublisher`] bundles everything needed to turn a [`Batch`] into a
//! single publish call: topic, client, strategy, retry count and formatter.
//! It is cheap to clone, so every async worker holds its own copy.

use std::fmt;

use log::debug;

use crate::buffer::Batch;
use crate::error::PublishOutcome;
use crate::formatter::SharedFormatter;
use crate::handlers::HandlerBuildError;
use crate::pubsub::{SharedPublishFn, SharedTransport, check_topic};

#[derive(Clone)]
pub struct BatchPublisher {
    topic: String,
    client: SharedTransport,
    publish_fn: SharedPublishFn,
    retry: u32,
    formatter: SharedFormatter,
}

impl BatchPublisher {
    pub fn new(
        topic: impl Into<String>,
        client: SharedTransport,
        publish_fn: SharedPublishFn,
        retry: u32,
        formatter: SharedFormatter,
    ) -> Self {
        Self {
            topic: topic.into(),
            client,
            publish_fn,
            retry,
            formatter,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Fail unless the topic exists.
    pub fn ensure_topic_exists(&self) -> Result<(), HandlerBuildError> {
        match check_topic(self.client.as_ref(), &self.topic, self.retry) {
            Ok(true) => Ok(()),
            Ok(false) => Err(HandlerBuildError::TopicNotFound(self.topic.clone())),
            Err(err) => Err(HandlerBuildError::TopicCheck {
                topic: self.topic.clone(),
                source: err,
            }),
        }
    }

    /// Publish `batch` as one request and classify the result.
    ///
    /// An empty batch is a no-op reported as success.
    pub fn publish(&self, batch: &Batch) -> PublishOutcome {
        if batch.is_empty() {
            return PublishOutcome::Success;
        }
        let body = batch.to_body(&self.formatter);
        debug!("publishing {} events to {}", body.len(), self.topic);
        self.publish_fn
            .publish_body(self.client.as_ref(), &body, &self.topic, self.retry)
            .into()
    }
}

impl fmt::Debug for BatchPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchPublisher")
            .field("topic", &self.topic)
            .field("retry", &self.retry)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}
