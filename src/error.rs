use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a query can fail, from loading settings to reading the response.
///
/// The configuration variants are produced before any network traffic happens;
/// the rest come out of [`crate::ApiClient::complete`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("Invalid LM_STUDIO_PORT '{0}': must be an integer between 1 and 65535")]
    InvalidPort(String),

    #[error("Invalid LM_STUDIO_MAX_TOKENS '{0}': must be a non-negative integer")]
    InvalidMaxTokens(String),

    #[error("Could not connect to LM Studio at {url}\nMake sure LM Studio is running and accessible.")]
    ConnectionFailed { url: String },

    #[error("Request to {url} timed out after {}s", .timeout.as_secs_f32())]
    TimedOut { url: String, timeout: Duration },

    #[error("HTTP {status} - {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected response format from API: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Other(String),
}
