//! REST client for Cloud Pub/Sub built on a pooled `ureq` agent.
//!
//! Requests are retried for transient failures (429, 5xx, and transport
//! errors) according to a [`RetryPolicy`]; the number of retries is chosen
//! per call by the handler. Error responses are mined for the reason string
//! in Google's JSON error envelope.

use std::{env, fmt, sync::Arc, thread, time::Duration};

use log::debug;
use serde::Deserialize;
use ureq::{Agent, AgentBuilder};

use super::body::PublishBody;
use super::retry::{RetryBackoff, RetryPolicy};
use super::transport::PubsubTransport;
use crate::error::{ClientError, PublishError};

/// Public REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://pubsub.googleapis.com/v1";
/// Environment variable holding an OAuth2 access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
/// Environment variable naming a local emulator (`host:port`).
pub const EMULATOR_HOST_ENV: &str = "PUBSUB_EMULATOR_HOST";
/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default timeout for a whole request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// OAuth2 bearer token.
    AccessToken(String),
    /// No authentication, as used by the emulator.
    Anonymous,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct PublishResponse {
    #[serde(rename = "messageIds", default)]
    message_ids: Vec<String>,
}

/// Authenticated handle to the Pub/Sub REST API.
#[derive(Clone)]
pub struct PubsubClient {
    agent: Agent,
    endpoint: String,
    credentials: Credentials,
    retry_policy: RetryPolicy,
}

impl PubsubClient {
    pub fn new(agent: Agent, endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            agent,
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
            credentials,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Override the delays used between transport-level retries.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn topic_url(&self, topic: &str) -> String {
        format!("{}/{}", self.endpoint, topic.trim_start_matches('/'))
    }

    fn authorize(&self, req: ureq::Request) -> ureq::Request {
        match &self.credentials {
            Credentials::AccessToken(token) => req.set("Authorization", &format!("Bearer {token}")),
            Credentials::Anonymous => req,
        }
    }

    /// Run `send` until it succeeds, fails permanently, or retries run out.
    fn execute<F>(&self, retry: u32, mut send: F) -> Result<ureq::Response, PublishError>
    where
        F: FnMut() -> Result<ureq::Response, Box<ureq::Error>>,
    {
        let mut backoff = RetryBackoff::new(self.retry_policy.clone(), retry);
        loop {
            let err = match send() {
                Ok(response) => return Ok(response),
                Err(err) => match *err {
                    ureq::Error::Status(status, response) => PublishError::Status {
                        status,
                        reason: error_reason(response),
                    },
                    ureq::Error::Transport(transport) => {
                        PublishError::Transport(transport.to_string())
                    }
                },
            };
            let retryable = matches!(err, PublishError::Transport(_)) || err.is_recoverable();
            if !retryable {
                return Err(err);
            }
            let Some(delay) = backoff.next_sleep() else {
                return Err(err);
            };
            debug!(
                "Pub/Sub request failed ({err}); retrying in {delay:?}, {} retries left",
                backoff.remaining()
            );
            thread::sleep(delay);
        }
    }
}

impl fmt::Debug for PubsubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PubsubClient")
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

impl PubsubTransport for PubsubClient {
    fn topic_exists(&self, topic: &str, retry: u32) -> Result<bool, PublishError> {
        let url = self.topic_url(topic);
        match self.execute(retry, || {
            self.authorize(self.agent.get(&url))
                .call()
                .map_err(Box::new)
        }) {
            Ok(response) => {
                // Drain so the connection can return to the pool.
                let _ = response.into_string();
                Ok(true)
            }
            Err(PublishError::Status { status: 404, .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn publish(&self, body: &PublishBody, topic: &str, retry: u32) -> Result<(), PublishError> {
        let url = format!("{}:publish", self.topic_url(topic));
        let payload =
            serde_json::to_string(body).map_err(|e| PublishError::Encode(e.to_string()))?;
        let response = self.execute(retry, || {
            self.authorize(self.agent.post(&url))
                .set("Content-Type", "application/json")
                .send_string(&payload)
                .map_err(Box::new)
        })?;
        let text = response
            .into_string()
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;
        let parsed: PublishResponse = serde_json::from_str(&text)
            .map_err(|e| PublishError::InvalidResponse(format!("{e}: {text}")))?;
        debug!(
            "published {} messages to {topic}",
            parsed.message_ids.len()
        );
        Ok(())
    }
}

/// Extract a human readable reason from an error response.
fn error_reason(response: ureq::Response) -> String {
    let status_text = response.status_text().to_owned();
    response
        .into_string()
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorEnvelope>(&body).ok())
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or(status_text)
}

fn default_agent() -> Result<Agent, ClientError> {
    let connector = native_tls::TlsConnector::new()?;
    Ok(AgentBuilder::new()
        .timeout_connect(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .tls_connector(Arc::new(connector))
        .build())
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Build a client from explicit settings or the environment.
///
/// When `PUBSUB_EMULATOR_HOST` is set the client targets the emulator over
/// plain HTTP and needs no credentials. Otherwise credentials come from
/// `credentials` or `GOOGLE_OAUTH_ACCESS_TOKEN`; with neither available the
/// call fails with [`ClientError::MissingCredentials`].
pub fn get_pubsub_client(
    credentials: Option<Credentials>,
    agent: Option<Agent>,
) -> Result<PubsubClient, ClientError> {
    let emulator = non_empty_env(EMULATOR_HOST_ENV);
    let endpoint = match &emulator {
        Some(host) => format!("http://{host}/v1"),
        None => DEFAULT_ENDPOINT.to_owned(),
    };
    let credentials = match credentials {
        Some(credentials) => credentials,
        None => match non_empty_env(ACCESS_TOKEN_ENV) {
            Some(token) => Credentials::AccessToken(token),
            None if emulator.is_some() => Credentials::Anonymous,
            None => return Err(ClientError::MissingCredentials),
        },
    };
    let agent = match agent {
        Some(agent) => agent,
        None => default_agent()?,
    };
    Ok(PubsubClient::new(agent, endpoint, credentials))
}
