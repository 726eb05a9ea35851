use thiserror::Error;

/// Failures a single price source can report.
///
/// Every one of these is absorbed inside the aggregation loop by falling
/// through to the next source in the chain; none of them reach the
/// aggregator's caller.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("upstream rate limit: {0}")]
    RateLimited(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("unknown commodity: {0}")]
    UnknownCommodity(String),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("source not configured")]
    NotConfigured,
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Configuration loading failures, surfaced once at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
