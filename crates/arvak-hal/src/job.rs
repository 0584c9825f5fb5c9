//! Job lifecycle types.
//!
//! The job state machine:
//!
//! ```text
//!   submit() ──→ Submitted ──→ Running ──→ Completed
//!                    │            │
//!                    │            ├──→ Error(reason)
//!                    │            │
//!                    ├────────────┴──→ Cancelled   (external)
//!                    │
//!                    └──→ Completed
//! ```
//!
//! **Invariants:**
//! - Transitions are monotonic: a job never moves backward.
//! - Terminal states (`Completed`, `Error`, `Cancelled`) are permanent.
//! - A result exists only once the status has been observed as `Completed`.

use serde::{Deserialize, Serialize};

/// Handle to a submitted job.
///
/// Carries everything needed to turn the remote result back into counts:
/// the remote job id, the requested shot count, the measurement permutation
/// (output bit `i` is taken from service bit `measure_permutation[i]`) and an
/// optional opaque post-processing descriptor.
///
/// Handles are immutable and compare by value over all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    job_id: String,
    shots: u32,
    measure_permutation: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    postprocess: Option<String>,
}

impl JobHandle {
    /// Create a new handle.
    pub fn new(
        job_id: impl Into<String>,
        shots: u32,
        measure_permutation: Vec<usize>,
        postprocess: Option<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            shots,
            measure_permutation,
            postprocess,
        }
    }

    /// Remote job identifier.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Number of shots requested at submission.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Measurement permutation descriptor.
    pub fn measure_permutation(&self) -> &[usize] {
        &self.measure_permutation
    }

    /// Opaque post-processing descriptor, if any.
    pub fn postprocess(&self) -> Option<&str> {
        self.postprocess.as_deref()
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.job_id)
    }
}

/// Status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job accepted by the service, waiting to run.
    Submitted,
    /// Job is currently running.
    Running,
    /// Job completed successfully.
    Completed,
    /// Job failed with the remote error message.
    Error(String),
    /// Job was cancelled.
    Cancelled,
}

impl JobStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Error(_) | JobStatus::Cancelled
        )
    }

    /// Check if the job is still pending (submitted or running).
    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Submitted | JobStatus::Running)
    }

    /// Check if the job completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }

    /// Short status name without the error message.
    pub fn name(&self) -> &'static str {
        match self {
            JobStatus::Submitted => "Submitted",
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Error(_) => "Error",
            JobStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Error(msg) => write!(f, "Error: {msg}"),
            other => write!(f, "{}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::Submitted.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Error("error".into()).is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_job_status_pending_and_success() {
        assert!(JobStatus::Submitted.is_pending());
        assert!(JobStatus::Running.is_pending());
        assert!(!JobStatus::Cancelled.is_pending());
        assert!(JobStatus::Completed.is_success());
        assert!(!JobStatus::Error("boom".into()).is_success());
    }

    #[test]
    fn test_job_status_display() {
        assert_eq!(JobStatus::Running.to_string(), "Running");
        assert_eq!(JobStatus::Error("boom".into()).to_string(), "Error: boom");
    }

    #[test]
    fn test_handle_equality_covers_all_fields() {
        let a = JobHandle::new("job-1", 100, vec![0, 1], None);
        assert_eq!(a, JobHandle::new("job-1", 100, vec![0, 1], None));
        assert_ne!(a, JobHandle::new("job-2", 100, vec![0, 1], None));
        assert_ne!(a, JobHandle::new("job-1", 200, vec![0, 1], None));
        assert_ne!(a, JobHandle::new("job-1", 100, vec![1, 0], None));
        assert_ne!(a, JobHandle::new("job-1", 100, vec![0, 1], Some("pp".into())));

        let set: HashSet<_> = [a.clone(), a.clone()].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_handle_serde_roundtrip() {
        let handle = JobHandle::new("abc", 10, vec![2, 0, 1], Some("{}".into()));
        let json = serde_json::to_string(&handle).unwrap();
        let back: JobHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(handle, back);
        assert_eq!(back.measure_permutation(), &[2, 0, 1]);
        assert_eq!(back.postprocess(), Some("{}"));
    }
}
