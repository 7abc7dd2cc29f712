use thiserror::Error;

/// Failure taxonomy for the resolution pipeline.
///
/// Every variant is a fallback signal for the orchestrator — none of these
/// is allowed to escape a request task as a panic.
#[derive(Error, Debug, Clone)]
pub enum RelayError {
    #[error("Request shorter than the 12-byte DNS header")]
    TooShort,

    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("No reply from upstream {server} after {attempts} attempts")]
    NoUpstreamReply { server: String, attempts: u32 },

    #[error("Transport error talking to {server}: {detail}")]
    Transport { server: String, detail: String },

    #[error("Upstream query timed out")]
    QueryTimeout,

    #[error("Upstream returned no usable answer")]
    EmptyAnswer,

    #[error("I/O error: {0}")]
    Io(String),
}

impl RelayError {
    /// Short classification tag used in fallback log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::TooShort => "too_short",
            RelayError::MalformedQuery(_) => "parse_error",
            RelayError::NoUpstreamReply { .. } => "no_upstream_reply",
            RelayError::Transport { .. } => "transport_error",
            RelayError::QueryTimeout => "timeout",
            RelayError::EmptyAnswer => "empty_answer",
            RelayError::Io(_) => "io_error",
        }
    }
}
