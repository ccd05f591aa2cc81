//! Failure classification for a chat exchange.

/// Fixed user-facing text for HTTP 429. The response body is ignored.
pub const RATE_LIMIT_NOTICE: &str = "request cadence exceeded — wait before retrying";

/// Used when a non-success response carries no readable `detail`.
pub const FALLBACK_DETAIL: &str = "failed to reach the assistant";

/// Errors from one exchange with the chat backend.
///
/// The `Display` text of every variant is safe to show to the user.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{}", RATE_LIMIT_NOTICE)]
    RateLimited,
    #[error("{0}")]
    ServerRejected(String),
    #[error("unable to connect to the assistant")]
    Transport(#[source] reqwest::Error),
    #[error("the assistant sent a reply that could not be read")]
    MalformedReply(#[source] reqwest::Error),
    #[error("the request was interrupted")]
    Interrupted,
}

impl GatewayError {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::RateLimited => "rate_limited",
            GatewayError::ServerRejected(_) => "server_rejected",
            GatewayError::Transport(_) => "transport",
            GatewayError::MalformedReply(_) => "malformed_reply",
            GatewayError::Interrupted => "interrupted",
        }
    }
}
