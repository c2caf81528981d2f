//! Error types for the fetch pipeline and the profiling client.

use chrono::{Local, TimeZone};
use thiserror::Error;

/// Errors raised while resolving an account or walking its timeline.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The supplied identifier is neither an `@handle` nor a numeric id.
    #[error("'{0}' is not a numeric account id or @handle")]
    InvalidIdentifier(String),

    /// Handle lookup succeeded but the provider knows no such account.
    #[error("handle {0} is not a valid account")]
    UnknownAccount(String),

    /// The provider signaled rate-limit exhaustion; no requests are sent
    /// until the reset time.
    #[error(
        "twitter rate limit reached, no requests will be sent until {}",
        fmt_reset(.reset_at_millis)
    )]
    RateLimited { reset_at_millis: i64 },

    /// Non-success response from the feed provider.
    #[error("feed provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider returned a payload we could not make sense of.
    #[error("malformed feed response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// Errors raised by the profiling service client.
#[derive(Debug, Error)]
pub enum ProfilingError {
    #[error("profiling service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Render an epoch-milliseconds reset time as a local wall-clock time,
/// e.g. "15:04:05".
pub fn format_reset_time(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn fmt_reset(millis: &i64) -> String {
    format_reset_time(*millis)
}
