/// Failure of a single poll cycle.
///
/// Every variant is handled the same way by the poller (logged, then shown
/// as the "connection failed" indicator); `kind()` only exists so logs can
/// tell a dead endpoint apart from a garbled payload.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("request to '{url}' failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("'{url}' answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("status payload could not be decoded: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollErrorKind {
    NetworkError,
    ParseError,
}

impl PollError {
    pub fn kind(&self) -> PollErrorKind {
        match self {
            PollError::Network { .. } | PollError::Status { .. } => PollErrorKind::NetworkError,
            PollError::Parse { .. } => PollErrorKind::ParseError,
        }
    }

    /// Stable identifier used in structured log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            PollError::Network { .. } => "POLL_NETWORK",
            PollError::Status { .. } => "POLL_HTTP_STATUS",
            PollError::Parse { .. } => "POLL_PARSE",
        }
    }
}
