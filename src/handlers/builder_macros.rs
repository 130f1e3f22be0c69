//! Macros for generating shared builder methods.
//!
//! Both builders expose the same fluent setters for the options stored in
//! [`CommonBuilder`](super::common::CommonBuilder). The macros keep those
//! definitions in one place.

/// Validate that a value is greater than zero, returning an error otherwise.
macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err($crate::handlers::HandlerBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

pub(crate) use ensure_positive;

/// Generate a consuming setter storing `Some(value)` in a (possibly
/// nested) field.
macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $($field:ident).+, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$($field).+ = Some(value);
            self
        }
    };
}

pub(crate) use option_setter;

/// Generate the setters shared by every builder with a `common` field.
macro_rules! common_builder_methods {
    ($builder:ident) => {
        impl $builder {
            /// Set the fully qualified topic, `projects/{project}/topics/{topic}`
            /// (required).
            pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
                self.common.topic = Some(topic.into());
                self
            }

            /// Use `client` instead of discovering one from the environment.
            pub fn with_client<C>(mut self, client: C) -> Self
            where
                C: $crate::pubsub::PubsubTransport + 'static,
            {
                self.common.client = Some(::std::sync::Arc::new(client));
                self
            }

            $crate::handlers::builder_macros::option_setter!(
                #[doc = "Use an already shared client."]
                with_shared_client,
                common.client,
                $crate::pubsub::SharedTransport
            );

            $crate::handlers::builder_macros::option_setter!(
                #[doc = "Credentials used when the client is discovered."]
                with_credentials,
                common.credentials,
                $crate::pubsub::Credentials
            );

            /// Replace the function used to publish each batch.
            pub fn with_publish_fn<P>(mut self, publish_fn: P) -> Self
            where
                P: $crate::pubsub::PublishFn + 'static,
            {
                self.common.publish_fn = Some(::std::sync::Arc::new(publish_fn));
                self
            }

            $crate::handlers::builder_macros::option_setter!(
                #[doc = "Use an already shared publish function."]
                with_shared_publish_fn,
                common.publish_fn,
                $crate::pubsub::SharedPublishFn
            );

            $crate::handlers::builder_macros::option_setter!(
                #[doc = "Set the number of client retries per publish call."]
                with_retry,
                common.retry,
                u32
            );

            $crate::handlers::builder_macros::option_setter!(
                #[doc = "Set the buffered event count that triggers a flush.\n\n# Validation\n\nThe capacity must be greater than zero; invalid values cause `build` to error."]
                with_capacity,
                common.capacity,
                usize
            );

            $crate::handlers::builder_macros::option_setter!(
                #[doc = "Events at or above this level flush immediately."]
                with_flush_level,
                common.flush_level,
                $crate::level::Level
            );

            $crate::handlers::builder_macros::option_setter!(
                #[doc = "Maximum number of events kept after a recoverable failure. Zero drops the whole failed batch."]
                with_buf_hard_limit,
                common.buf_hard_limit,
                usize
            );

            /// Format events with `formatter` before encoding.
            pub fn with_formatter<F>(mut self, formatter: F) -> Self
            where
                F: $crate::formatter::EventFormatter + 'static,
            {
                self.common.formatter = Some($crate::formatter::SharedFormatter::new(formatter));
                self
            }

            $crate::handlers::builder_macros::option_setter!(
                #[doc = "Set the interval between rate-limited drop warnings in milliseconds."]
                with_warn_interval_ms,
                common.warn_interval_ms,
                u64
            );
        }
    };
}

pub(crate) use common_builder_methods;
