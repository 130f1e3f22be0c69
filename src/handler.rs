use crate::error::HandlerError;
use crate::log_record::LogEvent;

/// Trait implemented by the Pub/Sub handlers.
///
/// Handlers are `Send + Sync` so one instance can serve every thread of the
/// process, for example as the backend of [`PubsubLogAdapter`](crate::PubsubLogAdapter).
pub trait PubsubHandlerTrait: Send + Sync {
    /// Accept one event for shipping.
    fn emit(&self, event: LogEvent) -> Result<(), HandlerError>;

    /// Publish whatever is currently buffered.
    fn flush(&self) -> Result<(), HandlerError>;
}
