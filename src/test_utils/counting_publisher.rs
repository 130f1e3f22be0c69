//! Publish strategy that records calls instead of talking to Pub/Sub.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::PublishError;
use crate::pubsub::{PublishBody, PublishFn, PubsubTransport, SharedPublishFn, decode};

#[derive(Debug, Default)]
struct State {
    calls: usize,
    attempted: Vec<PublishBody>,
    delivered: Vec<String>,
    retries: Vec<u32>,
    script: VecDeque<Result<(), PublishError>>,
    fallback: Option<PublishError>,
    delay: Duration,
}

/// Counts publish calls and the messages they carry.
///
/// Outcomes come from a script first, then from the fallback error if one is
/// set, otherwise every call succeeds. Only successful calls add to
/// [`messages`](Self::messages). Clones share state, so a test can keep one
/// copy and hand [`shared`](Self::shared) to a handler.
#[derive(Clone, Debug, Default)]
pub struct CountingPublisher {
    state: Arc<Mutex<State>>,
}

impl CountingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher failing every call with `err`.
    pub fn failing_with(err: PublishError) -> Self {
        let publisher = Self::new();
        publisher.state.lock().fallback = Some(err);
        publisher
    }

    /// Return the scripted outcomes in order before falling back.
    pub fn with_script(self, outcomes: impl IntoIterator<Item = Result<(), PublishError>>) -> Self {
        self.state.lock().script.extend(outcomes);
        self
    }

    /// Sleep for `delay` on every call to mimic network latency.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().delay = delay;
        self
    }

    /// Stop failing; subsequent unscripted calls succeed.
    pub fn recover(&self) {
        self.state.lock().fallback = None;
    }

    pub fn shared(&self) -> SharedPublishFn {
        Arc::new(self.clone())
    }

    /// Number of publish calls, successful or not.
    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }

    /// Bodies of every call, successful or not.
    pub fn bodies(&self) -> Vec<PublishBody> {
        self.state.lock().attempted.clone()
    }

    /// Decoded messages from successful calls, in delivery order.
    pub fn messages(&self) -> Vec<String> {
        self.state.lock().delivered.clone()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().delivered.len()
    }

    /// Retry count passed on each call.
    pub fn retries(&self) -> Vec<u32> {
        self.state.lock().retries.clone()
    }
}

impl PublishFn for CountingPublisher {
    fn publish_body(
        &self,
        _client: &dyn PubsubTransport,
        body: &PublishBody,
        _topic: &str,
        retry: u32,
    ) -> Result<(), PublishError> {
        let delay = self.state.lock().delay;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let mut state = self.state.lock();
        state.calls += 1;
        state.retries.push(retry);
        state.attempted.push(body.clone());
        let outcome = match state.script.pop_front() {
            Some(outcome) => outcome,
            None => state.fallback.clone().map_or(Ok(()), Err),
        };
        if outcome.is_ok() {
            let decoded = body
                .messages
                .iter()
                .map(|m| decode(&m.data).unwrap_or_default());
            state.delivered.extend(decoded);
        }
        outcome
    }
}
