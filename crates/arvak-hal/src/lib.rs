//! Arvak Hardware Abstraction Layer
//!
//! Shared vocabulary for talking to remote quantum services:
//! - A common [`Backend`] trait for submission, polling, cancellation and
//!   waiting
//! - [`JobHandle`] and [`JobStatus`] for the asynchronous job lifecycle
//! - [`ResultCache`], filled exactly once per handle
//! - [`Outcome`] and the basis-index codec, [`Counts`] and
//!   [`ExecutionResult`] for decoded results
//! - [`Capabilities`] to describe hardware features and constraints
//!
//! # Supported Backends
//!
//! | Backend | Crate | Authentication |
//! |---------|-------|----------------|
//! | IonQ (QPU, simulator) | `arvak-adapter-ionq` | `IONQ_API_KEY` env var or config file |
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use arvak_hal::{Backend, WaitOptions};
//! use arvak_adapter_ionq::IonqBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = IonqBackend::new("simulator")?;
//!     let handle = backend.submit(&circuit, 1000).await?;
//!
//!     let result = backend.wait(&handle, &WaitOptions::default()).await?;
//!     if let Some((outcome, count)) = result.counts.most_frequent() {
//!         println!("Most frequent: {outcome} ({count} times)");
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cache;
pub mod capability;
pub mod error;
pub mod job;
pub mod outcome;
pub mod result;

pub use backend::{Backend, DEFAULT_POLL_INTERVAL, ValidationResult, WaitOptions};
pub use cache::{CacheEntry, ResultCache};
pub use capability::{Capabilities, GateSet, Topology, TopologyKind};
pub use error::{HalError, HalResult};
pub use job::{JobHandle, JobStatus};
pub use outcome::{Endianness, Outcome};
pub use result::{Counts, ExecutionResult};
