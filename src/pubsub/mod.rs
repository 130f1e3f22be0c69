//! Cloud Pub/Sub collaborators used by the handlers.
//!
//! This module provides the pieces the handlers treat as black boxes:
//!
//! - [`get_pubsub_client`] builds an authenticated [`PubsubClient`].
//! - [`check_topic`] reports whether a topic exists, returning `false`
//!   rather than an error for a missing topic.
//! - [`publish_body`] sends one request body, already assembled as
//!   `{ "messages": [ { "data": ... } ] }`.
//! - [`encode`] turns formatted log text into a message payload.
//!
//! # Retry Semantics
//!
//! The client retries transient failures itself, `retry` times per call:
//!
//! - **2xx**: success.
//! - **429 / 5xx**: retried with jittered exponential backoff.
//! - **Network errors**: retried with jittered exponential backoff.
//! - **Other 4xx**: returned immediately.
//!
//! Whatever is still failing after the retries is handed back to the
//! handler, whose error classifier decides what happens to the batch.

mod body;
mod client;
mod retry;
mod transport;

#[cfg(test)]
mod tests;

pub use body::{PublishBody, PubsubMessage, decode, encode};
pub use client::{
    ACCESS_TOKEN_ENV, Credentials, DEFAULT_CONNECT_TIMEOUT, DEFAULT_ENDPOINT,
    DEFAULT_REQUEST_TIMEOUT, EMULATOR_HOST_ENV, PubsubClient, get_pubsub_client,
};
pub use retry::{DEFAULT_RETRY_BASE, DEFAULT_RETRY_CAP, RetryBackoff, RetryPolicy};
pub use transport::{
    PublishFn, PubsubTransport, SharedPublishFn, SharedTransport, check_topic,
    default_publish_fn, publish_body,
};
