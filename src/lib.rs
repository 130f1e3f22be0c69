//! Batched log shipping to Cloud Pub/Sub.
//!
//! Two handlers buffer [`LogEvent`]s and publish them to a topic as one
//! request per batch:
//!
//! - [`PubsubHandler`] flushes inline on the emitting thread.
//! - [`AsyncPubsubHandler`] spreads events over a pool of worker threads,
//!   each with its own buffer, so emitting never waits on the network.
//!
//! A batch is published when the buffer reaches capacity or an event at or
//! above the flush level arrives. Transient backend failures keep the batch
//! for the next flush, bounded by a hard limit; other failures are surfaced
//! (synchronous handler) or reported on a side channel (worker pool).
//!
//! With the `log-compat` feature, [`PubsubLogAdapter`] plugs either handler
//! into the `log` facade.

pub mod async_handler;
pub mod buffer;
pub mod error;
pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod level;
#[cfg(feature = "log-compat")]
pub mod log_compat;
pub mod log_record;
mod logging_macros;
pub mod publisher;
pub mod pubsub;
pub mod pubsub_handler;
pub mod rate_limited_warner;
pub mod side_channel;
#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use async_handler::{AsyncHandlerConfig, AsyncPubsubHandler};
pub use buffer::{Batch, BufferConfig, EventBuffer, FlushPolicy};
pub use error::{ClientError, ErrorClass, HandlerError, PublishError, PublishOutcome, classify};
pub use formatter::{DefaultFormatter, EventFormatter, PatternFormatter, SharedFormatter};
pub use handler::PubsubHandlerTrait;
pub use handlers::{
    AsyncPubsubHandlerBuilder, HandlerBuildError, HandlerBuilderTrait, PubsubHandlerBuilder,
};
pub use level::{Level, ParseLevelError, SharedLevel};
#[cfg(feature = "log-compat")]
pub use log_compat::{PubsubLogAdapter, install_global_logger};
pub use log_record::{LogEvent, RecordMetadata};
pub use pubsub::{
    Credentials, PublishBody, PublishFn, PubsubClient, PubsubTransport, check_topic, decode,
    encode, get_pubsub_client, publish_body,
};
pub use pubsub_handler::{PubsubHandler, PubsubHandlerConfig};
pub use side_channel::{LogSideChannel, NullSideChannel, SideChannel, StderrSideChannel};
