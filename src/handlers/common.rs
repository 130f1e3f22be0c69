//! Shared builder options.
//!
//! Stores the fields common to both handler builders and turns them into a
//! [`PubsubHandlerConfig`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::buffer::BufferConfig;
use crate::formatter::SharedFormatter;
use crate::level::Level;
use crate::pubsub::{Credentials, SharedPublishFn, SharedTransport, get_pubsub_client};
use crate::pubsub_handler::PubsubHandlerConfig;

use super::HandlerBuildError;
use super::builder_macros::ensure_positive;

#[derive(Clone, Default)]
pub struct CommonBuilder {
    pub(crate) topic: Option<String>,
    pub(crate) client: Option<SharedTransport>,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) publish_fn: Option<SharedPublishFn>,
    pub(crate) retry: Option<u32>,
    pub(crate) capacity: Option<usize>,
    pub(crate) flush_level: Option<Level>,
    pub(crate) buf_hard_limit: Option<usize>,
    pub(crate) formatter: Option<SharedFormatter>,
    pub(crate) warn_interval_ms: Option<u64>,
}

impl CommonBuilder {
    pub(crate) fn validate(&self) -> Result<(), HandlerBuildError> {
        match &self.topic {
            None => {
                return Err(HandlerBuildError::InvalidConfig(
                    "Pub/Sub handler requires a topic".into(),
                ));
            }
            Some(topic) if topic.trim().is_empty() => {
                return Err(HandlerBuildError::InvalidConfig(
                    "topic must not be empty".into(),
                ));
            }
            _ => {}
        }
        if let Some(capacity) = self.capacity {
            ensure_positive!(capacity, "capacity")?;
        }
        Ok(())
    }

    fn resolve_client(&self) -> Result<SharedTransport, HandlerBuildError> {
        match &self.client {
            Some(client) => Ok(Arc::clone(client)),
            None => {
                let client = get_pubsub_client(self.credentials.clone(), None)?;
                Ok(Arc::new(client))
            }
        }
    }

    /// Validate, resolve the client and apply defaults.
    pub(crate) fn build_config(&self) -> Result<PubsubHandlerConfig, HandlerBuildError> {
        self.validate()?;
        let topic = self.topic.clone().unwrap_or_default();
        let mut config = PubsubHandlerConfig::new(topic.trim(), self.resolve_client()?);
        let defaults = BufferConfig::default();
        config.buffer = BufferConfig {
            capacity: self.capacity.unwrap_or(defaults.capacity),
            hard_limit: self.buf_hard_limit.unwrap_or(defaults.hard_limit),
            flush_level: self.flush_level.unwrap_or(defaults.flush_level),
        };
        if let Some(publish_fn) = &self.publish_fn {
            config.publish_fn = Arc::clone(publish_fn);
        }
        if let Some(retry) = self.retry {
            config.retry = retry;
        }
        if let Some(formatter) = &self.formatter {
            config.formatter = formatter.clone();
        }
        if let Some(ms) = self.warn_interval_ms {
            config.warn_interval = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

impl fmt::Debug for CommonBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommonBuilder")
            .field("topic", &self.topic)
            .field("client", &self.client.as_ref().map(|_| "<client>"))
            .field("credentials", &self.credentials)
            .field("publish_fn", &self.publish_fn.as_ref().map(|_| "<publish_fn>"))
            .field("retry", &self.retry)
            .field("capacity", &self.capacity)
            .field("flush_level", &self.flush_level)
            .field("buf_hard_limit", &self.buf_hard_limit)
            .field("formatter", &self.formatter)
            .field("warn_interval_ms", &self.warn_interval_ms)
            .finish()
    }
}
