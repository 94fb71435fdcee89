//! Error taxonomy for exposee synchronisation.
//!
//! [`SyncError`] is the only failure a caller of
//! [`ExposeeServiceClient::fetch`](crate::client::ExposeeServiceClient::fetch)
//! ever observes. Each variant is terminal for the call; retry and backoff
//! policy belongs to whatever schedules the fetches.

use std::time::Duration;

use thiserror::Error;

/// Failure to obtain any response from the backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS, TLS, socket, or timeout failures surfaced by the HTTP client.
    #[error("transport error: {0}")]
    Request(#[from] reqwest::Error),
    /// The URL uses plaintext HTTP and the client was not configured to allow it.
    #[error("insecure url requires explicit opt-in: {0}")]
    InsecureUrl(String),
    /// The exchange ended without delivering a result (task panic or runtime shutdown).
    #[error("exchange interrupted before a response was delivered")]
    Interrupted,
}

/// Failure to turn a response body into an [`ExposedBatch`](crate::decode::ExposedBatch).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Field framing is truncated or otherwise invalid.
    #[error("malformed exposee payload: {0}")]
    Malformed(#[from] prost::DecodeError),
    /// The key date cannot be represented as a calendar timestamp.
    #[error("key date {0} is outside the representable range")]
    OnsetOutOfRange(i64),
}

/// Terminal outcome of a failed fetch.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No response was obtained.
    #[error("network transport failure: {0}")]
    NetworkTransport(#[from] TransportError),
    /// A response was obtained but its status is outside the 2xx range.
    #[error("invalid response code {0}")]
    InvalidResponseCode(u16),
    /// The server `Date` header deviates from local time by more than the threshold.
    #[error("server time deviates from local time by {shift:?}")]
    TimeInconsistency {
        /// Measured absolute difference between local and server time.
        shift: Duration,
    },
    /// The response body could not be decoded.
    #[error("payload decode failure: {0}")]
    PayloadDecodeFailure(#[from] DecodeError),
}

impl SyncError {
    /// Stable short label used in log fields and telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::NetworkTransport(_) => "network-transport",
            SyncError::InvalidResponseCode(_) => "invalid-response-code",
            SyncError::TimeInconsistency { .. } => "time-inconsistency",
            SyncError::PayloadDecodeFailure(_) => "payload-decode-failure",
        }
    }
}

/// Errors raised while constructing a client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The dedicated tokio runtime could not be started.
    #[error("failed to build runtime: {0}")]
    Runtime(#[from] std::io::Error),
    /// The underlying HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}
