//! Error types and publish-failure classification.
//!
//! Every failure coming back from a publish function is a [`PublishError`].
//! [`classify`] labels it [`ErrorClass::Recoverable`] (transient, keep the
//! batch and try again on the next flush) or [`ErrorClass::Fatal`] (surface
//! it or report it, then let the batch go).
//!
//! # Classification rules
//!
//! * **429** and **5xx** statuses are recoverable.
//! * [`PublishError::Recoverable`] is recoverable by construction; custom
//!   publish functions use it to request a retry on the next flush.
//! * Every other status, and every failure that carries no status at all,
//!   is fatal. Unknown conditions fail loudly.

use thiserror::Error;

/// Failure reported by a publish or topic-check call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The backend answered with a non-success HTTP status.
    #[error("Pub/Sub returned HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
    /// A transient failure flagged by the publish function itself.
    #[error("recoverable publish failure: {0}")]
    Recoverable(String),
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The response could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The request body could not be serialised.
    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl PublishError {
    /// Build a status error, mostly useful for stub publishers.
    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        Self::Status {
            status,
            reason: reason.into(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        classify(self)
    }

    pub fn is_recoverable(&self) -> bool {
        self.class() == ErrorClass::Recoverable
    }
}

/// Label attached to a publish failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient backend condition; safe to retry later.
    Recoverable,
    /// Must be propagated (sync) or reported (async).
    Fatal,
}

/// Classify an HTTP status returned by the backend.
pub fn classify_status(status: u16) -> ErrorClass {
    match status {
        429 => ErrorClass::Recoverable,
        500..=599 => ErrorClass::Recoverable,
        _ => ErrorClass::Fatal,
    }
}

/// Classify a publish failure.
pub fn classify(err: &PublishError) -> ErrorClass {
    match err {
        PublishError::Status { status, .. } => classify_status(*status),
        PublishError::Recoverable(_) => ErrorClass::Recoverable,
        PublishError::Transport(_)
        | PublishError::InvalidResponse(_)
        | PublishError::Encode(_) => ErrorClass::Fatal,
    }
}

/// Result of a single publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Success,
    RecoverableFailure(PublishError),
    FatalFailure(PublishError),
}

impl From<Result<(), PublishError>> for PublishOutcome {
    fn from(result: Result<(), PublishError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(err) => match classify(&err) {
                ErrorClass::Recoverable => Self::RecoverableFailure(err),
                ErrorClass::Fatal => Self::FatalFailure(err),
            },
        }
    }
}

/// Errors raised while obtaining a Pub/Sub client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No credentials were supplied and none could be discovered.
    #[error(
        "no Pub/Sub credentials found; set {token_env} or {emulator_env}, or pass credentials explicitly",
        token_env = crate::pubsub::ACCESS_TOKEN_ENV,
        emulator_env = crate::pubsub::EMULATOR_HOST_ENV
    )]
    MissingCredentials,
    /// The TLS backend could not be initialised.
    #[error("failed to initialise TLS: {0}")]
    Tls(#[from] native_tls::Error),
}

/// Errors returned by a running handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A flush failed with a fatal publish error.
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
    /// The handler has been closed.
    #[error("handler is closed")]
    Closed,
    /// Workers did not acknowledge a flush in time.
    #[error("flush was not acknowledged within the timeout")]
    FlushTimeout,
}
