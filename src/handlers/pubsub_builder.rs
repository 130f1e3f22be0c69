//! Builder for [`PubsubHandler`](crate::pubsub_handler::PubsubHandler).

use crate::pubsub_handler::{PubsubHandler, PubsubHandlerConfig};

use super::builder_macros::common_builder_methods;
use super::common::CommonBuilder;
use super::{HandlerBuildError, HandlerBuilderTrait};

/// Builder for constructing [`PubsubHandler`] instances.
///
/// ```no_run
/// use pubsub_logging::{Level, PubsubHandlerBuilder};
///
/// let handler = PubsubHandlerBuilder::new()
///     .with_topic("projects/my-project/topics/logs")
///     .with_capacity(500)
///     .with_flush_level(Level::Error)
///     .build()?;
/// # Ok::<(), pubsub_logging::HandlerBuildError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct PubsubHandlerBuilder {
    common: CommonBuilder,
}

impl PubsubHandlerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the options and produce the handler configuration without
    /// checking the topic.
    pub fn build_config(&self) -> Result<PubsubHandlerConfig, HandlerBuildError> {
        self.common.build_config()
    }

    /// Build the handler, failing if the topic does not exist.
    pub fn build(&self) -> Result<PubsubHandler, HandlerBuildError> {
        self.build_inner()
    }
}

common_builder_methods!(PubsubHandlerBuilder);

impl HandlerBuilderTrait for PubsubHandlerBuilder {
    type Handler = PubsubHandler;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        PubsubHandler::with_config(self.build_config()?)
    }
}
