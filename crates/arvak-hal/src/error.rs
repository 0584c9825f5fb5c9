//! Error types for the HAL crate.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// No credential available, or the credential was rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The remote service rejected the job.
    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    /// The transport could not reach the remote endpoint.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Unrecognized remote status or malformed response.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The remote service refused to cancel the job.
    #[error("Job cancellation failed: {0}")]
    CancellationFailed(String),

    /// Result data is inconsistent with the requested shot count.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A measurement permutation does not fit the outcome it is applied to.
    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    /// Job execution failed remotely. Carries the remote message verbatim.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job cancelled")]
    JobCancelled,

    /// The wait deadline passed before the job reached a terminal state.
    ///
    /// The job may still complete; the handle stays valid.
    #[error("Timeout waiting for job {job_id} after {elapsed:?}")]
    Timeout {
        /// Remote job identifier.
        job_id: String,
        /// Time spent waiting.
        elapsed: Duration,
    },

    /// Invalid circuit.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl HalError {
    /// Whether the caller may reasonably retry the failed operation later.
    ///
    /// Connection failures and timeouts are transient; everything else is
    /// a definite answer from the remote side or from local decoding.
    pub fn is_transient(&self) -> bool {
        matches!(self, HalError::Connection(_) | HalError::Timeout { .. })
    }
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
