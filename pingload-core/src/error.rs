use thiserror::Error;

/// Why a single sample failed. Carried inside the [`Sample`](crate::Sample) rather than
/// propagated, so one failure never aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum SampleError {
    /// Connection refused, timeout, DNS failure or an unreadable response body.
    #[error("{0}")]
    Network(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),
}

impl SampleError {
    pub const TIMEOUT_PREFIX: &'static str = "timed out";

    pub fn timeout(after: std::time::Duration) -> Self {
        SampleError::Network(format!(
            "{} after {}",
            Self::TIMEOUT_PREFIX,
            humantime::format_duration(after)
        ))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SampleError::Network(msg) if msg.starts_with(Self::TIMEOUT_PREFIX))
    }
}

/// Configuration problems. These are the only fatal errors and are detected before any
/// request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL `{0}`: expected an http:// or https:// address with a host")]
    UnsupportedUrl(String),

    #[error("{0} needs at least one worker")]
    ZeroWorkers(&'static str),

    #[error("{0} needs at least one request")]
    ZeroRequests(&'static str),

    #[error("Progressive load needs at least one load level")]
    NoLoadLevels,

    #[error("Load level 0 is not a valid worker count")]
    ZeroLoadLevel,
}
