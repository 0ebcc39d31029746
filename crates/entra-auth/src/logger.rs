//! Request-scoped logger used by the validator and the middleware
//!
//! Validation failures are never returned to HTTP callers; they only show up
//! in server-side logs. The validator therefore takes the logger as an
//! argument so each request can log through its own span or sink.
//! [`TracingLogger`] forwards to `tracing` and is what the middleware uses
//! unless told otherwise.

use std::error::Error as StdError;
use std::fmt;

/// One log call: either a plain message or an error value
#[derive(Clone, Copy)]
pub enum LogEvent<'a> {
    /// A human readable message
    Message(&'a str),
    /// An error raised by a validation stage
    Error(&'a (dyn StdError + 'static)),
}

impl fmt::Debug for LogEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => f.debug_tuple("Message").field(message).finish(),
            Self::Error(err) => f.debug_tuple("Error").field(&err.to_string()).finish(),
        }
    }
}

impl fmt::Display for LogEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Error(err) => write!(f, "{err}"),
        }
    }
}

impl<'a> From<&'a str> for LogEvent<'a> {
    fn from(message: &'a str) -> Self {
        Self::Message(message)
    }
}

/// Logger sink with the two levels the auth path needs
pub trait AuthLogger: Send + Sync {
    /// Record a validation failure
    fn error(&self, event: LogEvent<'_>);

    /// Record diagnostic detail
    fn debug(&self, event: LogEvent<'_>);
}

/// [`AuthLogger`] backed by `tracing` under the `entra_auth` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl AuthLogger for TracingLogger {
    fn error(&self, event: LogEvent<'_>) {
        match event {
            LogEvent::Message(message) => tracing::error!(target: "entra_auth", "{message}"),
            LogEvent::Error(err) => tracing::error!(target: "entra_auth", error = %err, "{err}"),
        }
    }

    fn debug(&self, event: LogEvent<'_>) {
        match event {
            LogEvent::Message(message) => tracing::debug!(target: "entra_auth", "{message}"),
            LogEvent::Error(err) => tracing::debug!(target: "entra_auth", error = %err, "{err}"),
        }
    }
}
