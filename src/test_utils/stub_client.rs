use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::PublishError;
use crate::pubsub::{PublishBody, PubsubTransport, SharedTransport};

/// In-memory stand-in for [`PubsubClient`](crate::pubsub::PubsubClient).
///
/// Topic checks return a fixed answer; direct publishes always succeed. Pair
/// it with [`CountingPublisher`](super::CountingPublisher) to observe
/// publishes made by a handler.
#[derive(Clone, Debug)]
pub struct StubClient {
    topic_exists: Result<bool, PublishError>,
    topic_checks: Arc<AtomicUsize>,
    publishes: Arc<AtomicUsize>,
}

impl Default for StubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StubClient {
    /// Every topic exists.
    pub fn new() -> Self {
        Self {
            topic_exists: Ok(true),
            topic_checks: Arc::new(AtomicUsize::new(0)),
            publishes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// No topic exists.
    pub fn missing_topics() -> Self {
        Self {
            topic_exists: Ok(false),
            ..Self::new()
        }
    }

    /// Topic checks fail with `err`.
    pub fn failing_topic_check(err: PublishError) -> Self {
        Self {
            topic_exists: Err(err),
            ..Self::new()
        }
    }

    pub fn shared(&self) -> SharedTransport {
        Arc::new(self.clone())
    }

    pub fn topic_checks(&self) -> usize {
        self.topic_checks.load(Ordering::SeqCst)
    }

    /// Publishes sent straight to the client rather than through a strategy.
    pub fn publishes(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }
}

impl PubsubTransport for StubClient {
    fn topic_exists(&self, _topic: &str, _retry: u32) -> Result<bool, PublishError> {
        self.topic_checks.fetch_add(1, Ordering::SeqCst);
        self.topic_exists.clone()
    }

    fn publish(&self, _body: &PublishBody, _topic: &str, _retry: u32) -> Result<(), PublishError> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
