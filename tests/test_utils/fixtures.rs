//! Fixtures pairing a handler builder with the stubs observing it.
//!
//! Every fixture wires a [`StubClient`] whose topics exist and a
//! [`CountingPublisher`] the test keeps a clone of.

#![allow(dead_code)]

use pubsub_logging::test_utils::{CollectingSideChannel, CountingPublisher, StubClient};
use pubsub_logging::{AsyncPubsubHandlerBuilder, LogEvent, Level, PubsubHandlerBuilder};
use rstest::fixture;

pub const TOPIC: &str = "projects/test-project/topics/test-topic";

/// A fresh publisher that accepts every batch.
#[fixture]
pub fn publisher() -> CountingPublisher {
    CountingPublisher::new()
}

#[fixture]
pub fn side_channel() -> CollectingSideChannel {
    CollectingSideChannel::new()
}

pub fn sync_builder(publisher: &CountingPublisher) -> PubsubHandlerBuilder {
    PubsubHandlerBuilder::new()
        .with_topic(TOPIC)
        .with_client(StubClient::new())
        .with_shared_publish_fn(publisher.shared())
}

pub fn async_builder(
    publisher: &CountingPublisher,
    side_channel: &CollectingSideChannel,
) -> AsyncPubsubHandlerBuilder {
    AsyncPubsubHandlerBuilder::new()
        .with_topic(TOPIC)
        .with_client(StubClient::new())
        .with_shared_publish_fn(publisher.shared())
        .with_side_channel(side_channel.clone())
}

pub fn event(level: Level, message: &str) -> LogEvent {
    LogEvent::new("integration", level, message)
}
