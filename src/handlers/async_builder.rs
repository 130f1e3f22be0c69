//! Builder for [`AsyncPubsubHandler`](crate::async_handler::AsyncPubsubHandler).
//!
//! Adds the worker-pool options (worker count, side channel, flush timeout
//! and shutdown attempts) on top of the shared options.

use std::sync::Arc;
use std::time::Duration;

use crate::async_handler::{AsyncHandlerConfig, AsyncPubsubHandler};
use crate::side_channel::{SharedSideChannel, SideChannel};

use super::builder_macros::{common_builder_methods, ensure_positive, option_setter};
use super::common::CommonBuilder;
use super::{HandlerBuildError, HandlerBuilderTrait};

/// Builder for constructing [`AsyncPubsubHandler`] instances.
#[derive(Clone, Default)]
pub struct AsyncPubsubHandlerBuilder {
    common: CommonBuilder,
    worker_num: Option<usize>,
    side_channel: Option<SharedSideChannel>,
    flush_timeout_ms: Option<u64>,
    shutdown_flush_attempts: Option<u32>,
}

impl AsyncPubsubHandlerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    option_setter!(
        #[doc = "Set the number of worker threads."]
        with_worker_num,
        worker_num,
        usize
    );
    option_setter!(
        #[doc = "Set how long `flush` waits for the workers, in milliseconds."]
        with_flush_timeout_ms,
        flush_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set how many times a worker retries its final flush on shutdown."]
        with_shutdown_flush_attempts,
        shutdown_flush_attempts,
        u32
    );

    /// Report worker failures to `side_channel` instead of standard error.
    pub fn with_side_channel<S>(mut self, side_channel: S) -> Self
    where
        S: SideChannel + 'static,
    {
        self.side_channel = Some(Arc::new(side_channel));
        self
    }

    fn validate(&self) -> Result<(), HandlerBuildError> {
        if let Some(workers) = self.worker_num {
            ensure_positive!(workers, "worker_num")?;
        }
        if let Some(timeout) = self.flush_timeout_ms {
            ensure_positive!(timeout, "flush_timeout_ms")?;
        }
        if let Some(attempts) = self.shutdown_flush_attempts {
            ensure_positive!(attempts, "shutdown_flush_attempts")?;
        }
        Ok(())
    }

    /// Validate the options and produce the handler configuration without
    /// checking the topic.
    pub fn build_config(&self) -> Result<AsyncHandlerConfig, HandlerBuildError> {
        self.validate()?;
        let handler = self.common.build_config()?;
        let mut config = AsyncHandlerConfig::new(handler.topic.clone(), handler.client.clone());
        config.handler = handler;
        if let Some(workers) = self.worker_num {
            config.worker_num = workers;
        }
        if let Some(side_channel) = &self.side_channel {
            config.side_channel = Arc::clone(side_channel);
        }
        if let Some(ms) = self.flush_timeout_ms {
            config.flush_timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = self.shutdown_flush_attempts {
            config.shutdown_flush_attempts = attempts;
        }
        Ok(config)
    }

    /// Build the handler and start its workers.
    pub fn build(&self) -> Result<AsyncPubsubHandler, HandlerBuildError> {
        self.build_inner()
    }
}

common_builder_methods!(AsyncPubsubHandlerBuilder);

impl HandlerBuilderTrait for AsyncPubsubHandlerBuilder {
    type Handler = AsyncPubsubHandler;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        AsyncPubsubHandler::with_config(self.build_config()?)
    }
}

impl std::fmt::Debug for AsyncPubsubHandlerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncPubsubHandlerBuilder")
            .field("common", &self.common)
            .field("worker_num", &self.worker_num)
            .field("flush_timeout_ms", &self.flush_timeout_ms)
            .field("shutdown_flush_attempts", &self.shutdown_flush_attempts)
            .finish_non_exhaustive()
    }
}
