//! Logging macros that capture source location.
//!
//! Each macro captures `file!()`, `line!()`, and `module_path!()` at the
//! call site, embeds them in the event's [`RecordMetadata`] and emits the
//! event through any [`PubsubHandlerTrait`] implementor. The logger name is
//! the calling module's path. Every macro evaluates to the handler's
//! `Result<(), HandlerError>`.
//!
//! # Examples
//!
//! ```rust,ignore
//! let handler = PubsubHandlerBuilder::new()
//!     .with_topic("projects/p/topics/logs")
//!     .build()?;
//! pubsub_info!(handler, "server started on port {}", 8080)?;
//! pubsub_critical!(handler, "database unreachable")?;
//! ```
//!
//! [`RecordMetadata`]: crate::log_record::RecordMetadata
//! [`PubsubHandlerTrait`]: crate::PubsubHandlerTrait

/// Emit an event at an explicit [`Level`](crate::Level).
#[macro_export]
macro_rules! pubsub_log {
    ($handler:expr, $level:expr, $($arg:tt)+) => {
        $crate::__pubsub_log_impl!($handler, $level, &::std::format!($($arg)+))
    };
}

#[macro_export]
macro_rules! pubsub_debug {
    ($handler:expr, $($arg:tt)+) => {
        $crate::pubsub_log!($handler, $crate::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! pubsub_info {
    ($handler:expr, $($arg:tt)+) => {
        $crate::pubsub_log!($handler, $crate::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! pubsub_warn {
    ($handler:expr, $($arg:tt)+) => {
        $crate::pubsub_log!($handler, $crate::Level::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! pubsub_error {
    ($handler:expr, $($arg:tt)+) => {
        $crate::pubsub_log!($handler, $crate::Level::Error, $($arg)+)
    };
}

/// Emit a `CRITICAL` event. With the default flush level this publishes the
/// buffer immediately.
#[macro_export]
macro_rules! pubsub_critical {
    ($handler:expr, $($arg:tt)+) => {
        $crate::pubsub_log!($handler, $crate::Level::Critical, $($arg)+)
    };
}

/// Internal implementation macro, not part of the public API.
#[doc(hidden)]
#[macro_export]
macro_rules! __pubsub_log_impl {
    ($handler:expr, $level:expr, $message:expr) => {{
        use $crate::PubsubHandlerTrait as _;
        let metadata = $crate::RecordMetadata {
            module_path: ::std::string::String::from(::std::module_path!()),
            filename: ::std::string::String::from(::std::file!()),
            line_number: ::std::line!(),
            ..::std::default::Default::default()
        };
        $handler.emit($crate::LogEvent::with_metadata(
            ::std::module_path!(),
            $level,
            $message,
            metadata,
        ))
    }};
}
