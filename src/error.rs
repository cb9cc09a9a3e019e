//! Error taxonomy for the ingestion/distribution engine (spec §7).
//!
//! Every variant here maps to one of the named error kinds in the design:
//! `ConfigError` is fatal at startup, `DatabaseError`/`UpstreamTransient`
//! are retried or skipped without tearing down the scheduler, and
//! `DeviceNotFound` is the only internal error that reaches a device as
//! anything other than a 200 envelope with `data_available=false`.

use thiserror::Error;

/// Fatal at startup: missing env var, empty registry, bad port.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("location registry is empty")]
    EmptyRegistry,
}

/// Errors from a single outbound HTTP fetch (spec §4.2).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("upstream returned HTTP {0}")]
    HttpStatus(u16),

    #[error("rate limited, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("failed to decode response body: {0}")]
    DecodeError(String),
}

impl FetchError {
    /// Transient errors are worth retrying within the same job (spec §4.2);
    /// HTTP 4xx (other than 429) is not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout | FetchError::NetworkError(_) | FetchError::HttpStatus(500..=599)
        )
    }
}

/// Errors from turning a raw JSON body into a partial normalized record
/// (spec §4.1).
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("no adapter registered for host {0}")]
    UnknownAdapter(String),

    #[error("fetch failed: {reason}")]
    FetchFailed { reason: String },
}

/// Errors from the Repository (spec §4.5).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("device not found")]
    DeviceNotFound,
}

/// Raised by the Normalizer when a cycle's sources don't satisfy the
/// required fields (spec §4.3); the caller keeps the prior row.
#[derive(Debug, Error)]
#[error("normalization insufficient: {0}")]
pub struct NormalizationError(pub String);
