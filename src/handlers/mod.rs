//! Handler builders and associated traits.
//!
//! Provides a builder API for constructing handlers in a type-safe manner.
//! Each builder implements [`HandlerBuilderTrait`], validates its options,
//! resolves a Pub/Sub client when none was supplied and returns a handler
//! whose topic is known to exist.

use std::io;

use thiserror::Error;

use crate::error::{ClientError, PublishError};

mod async_builder;
mod builder_macros;
mod common;
mod pubsub_builder;

pub use async_builder::AsyncPubsubHandlerBuilder;
pub use pubsub_builder::PubsubHandlerBuilder;

/// Errors that may occur while building a handler.
#[derive(Debug, Error)]
pub enum HandlerBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
    /// The configured topic does not exist.
    #[error("topic {0} does not exist")]
    TopicNotFound(String),
    /// No client was supplied and none could be created.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// The existence check itself failed.
    #[error("failed to check topic {topic}: {source}")]
    TopicCheck {
        topic: String,
        #[source]
        source: PublishError,
    },
    /// A worker thread could not be spawned.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Trait implemented by all handler builders.
pub trait HandlerBuilderTrait: Send + Sync {
    type Handler;

    /// Build the handler instance.
    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError>;
}
