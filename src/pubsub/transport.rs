//! Boundary between the handlers and whatever talks to Pub/Sub.
//!
//! Handlers only ever see a [`PubsubTransport`] (the client) and a
//! [`PublishFn`] (the strategy used to publish through it). Production code
//! wires [`PubsubClient`](super::PubsubClient) and [`publish_body`]; tests
//! inject stubs implementing the same traits.

use std::sync::Arc;

use super::body::PublishBody;
use crate::error::PublishError;

/// A client able to check topics and publish request bodies.
///
/// `retry` is the number of transport-level retries the client may make
/// for transient failures before reporting the error.
pub trait PubsubTransport: Send + Sync {
    /// Return whether `topic` exists. A missing topic is `Ok(false)`, not an
    /// error.
    fn topic_exists(&self, topic: &str, retry: u32) -> Result<bool, PublishError>;

    /// Publish `body` to `topic` in a single request.
    fn publish(&self, body: &PublishBody, topic: &str, retry: u32) -> Result<(), PublishError>;
}

/// Shared client handle used by handlers and workers.
pub type SharedTransport = Arc<dyn PubsubTransport>;

/// Strategy used by the handlers to publish a batch.
///
/// Any `Fn(&dyn PubsubTransport, &PublishBody, &str, u32)` closure
/// qualifies, which makes it simple to swap in counting or failing
/// publishers.
pub trait PublishFn: Send + Sync {
    fn publish_body(
        &self,
        client: &dyn PubsubTransport,
        body: &PublishBody,
        topic: &str,
        retry: u32,
    ) -> Result<(), PublishError>;
}

impl<F> PublishFn for F
where
    F: Fn(&dyn PubsubTransport, &PublishBody, &str, u32) -> Result<(), PublishError> + Send + Sync,
{
    fn publish_body(
        &self,
        client: &dyn PubsubTransport,
        body: &PublishBody,
        topic: &str,
        retry: u32,
    ) -> Result<(), PublishError> {
        self(client, body, topic, retry)
    }
}

/// Shared publish strategy.
pub type SharedPublishFn = Arc<dyn PublishFn>;

/// Return whether `topic` exists.
pub fn check_topic(
    client: &dyn PubsubTransport,
    topic: &str,
    retry: u32,
) -> Result<bool, PublishError> {
    client.topic_exists(topic, retry)
}

/// Publish `body` to `topic`. This is the default [`PublishFn`].
pub fn publish_body(
    client: &dyn PubsubTransport,
    body: &PublishBody,
    topic: &str,
    retry: u32,
) -> Result<(), PublishError> {
    client.publish(body, topic, retry)
}

/// The [`publish_body`] function as a shared strategy.
pub fn default_publish_fn() -> SharedPublishFn {
    Arc::new(publish_body)
}
