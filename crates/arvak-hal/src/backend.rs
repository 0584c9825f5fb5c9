//! Backend trait and wait policy.
//!
//! The [`Backend`] trait defines the lifecycle for interacting with a
//! remote quantum service:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ wait()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! ## Method table
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `cache()` | sync | yes | `&ResultCache` |
//! | `validate()` | async | yes | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobHandle>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::cache::ResultCache;
use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobHandle, JobStatus};
use crate::result::ExecutionResult;

/// Default interval between status polls in [`Backend::wait`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long and how often [`Backend::wait`] polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Give up after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Sleep between polls.
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitOptions {
    /// Wait indefinitely with the default poll interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Trait for remote quantum backends.
///
/// # Contract
///
/// - `capabilities()` is synchronous and infallible; it is fixed at
///   construction.
/// - `submit()` registers the returned handle in `cache()`.
/// - `status()` is the only writer of results into `cache()`, and writes at
///   most once per handle, on the first `Completed` observation.
/// - `wait()` has a default implementation driven by [`WaitOptions`].
#[async_trait]
pub trait Backend: Send + Sync {
    /// Device-native circuit representation accepted by this backend.
    type Circuit: Send + Sync;

    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// The result cache this backend populates.
    fn cache(&self) -> &ResultCache;

    /// Validate a circuit against backend constraints.
    async fn validate(&self, circuit: &Self::Circuit) -> HalResult<ValidationResult>;

    /// Submit a circuit for execution.
    async fn submit(&self, circuit: &Self::Circuit, shots: u32) -> HalResult<JobHandle>;

    /// Poll the status of a job, populating the cache on completion.
    async fn status(&self, handle: &JobHandle) -> HalResult<JobStatus>;

    /// Request cancellation of a job.
    ///
    /// Does not interrupt a concurrent `wait()`; the waiter observes the
    /// cancellation through `status()`.
    async fn cancel(&self, handle: &JobHandle) -> HalResult<()>;

    /// Wait for a job to complete and return its result.
    ///
    /// Returns a cached result immediately. Otherwise polls `status()` every
    /// `poll_interval` until the job completes, fails, is cancelled, or the
    /// timeout (measured from the start of this call) elapses. A timeout
    /// leaves the handle usable for a later `wait()`.
    async fn wait(&self, handle: &JobHandle, options: &WaitOptions) -> HalResult<ExecutionResult> {
        if let Some(result) = self.cache().get(handle).await {
            return Ok(result);
        }

        let start = Instant::now();
        loop {
            if let Some(timeout) = options.timeout {
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    return Err(HalError::Timeout {
                        job_id: handle.job_id().to_string(),
                        elapsed,
                    });
                }
            }

            match self.status(handle).await? {
                JobStatus::Completed => {
                    return self.cache().get(handle).await.ok_or_else(|| {
                        HalError::Protocol(format!(
                            "job {handle} reported completed but produced no result"
                        ))
                    });
                }
                JobStatus::Error(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                status @ (JobStatus::Submitted | JobStatus::Running) => {
                    debug!("Job {} is {}, polling again", handle, status);
                    // Never sleep past the deadline.
                    let nap = options.timeout.map_or(options.poll_interval, |timeout| {
                        options
                            .poll_interval
                            .min(timeout.saturating_sub(start.elapsed()))
                    });
                    sleep(nap).await;
                }
            }
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Circuit is valid and can be submitted directly.
    Valid,
    /// Circuit is invalid for this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the circuit is valid (can be submitted as-is).
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Build a result from a list of problems; empty means valid.
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        }
    }
}
