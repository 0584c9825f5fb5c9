//! Arvak Adapter for IonQ Trapped-Ion Quantum Computers
//!
//! This crate provides a backend implementation for submitting circuits to
//! IonQ devices through the jobs REST API (`https://api.ionq.co/v0.1`).
//!
//! # Supported Devices
//!
//! | Device      | Type      | Qubits | Notes                        |
//! |-------------|-----------|--------|------------------------------|
//! | `qpu`       | hardware  | 11     | Trapped-ion QPU              |
//! | `simulator` | simulator | 11     | Cloud-hosted ideal simulator |
//!
//! # Authentication
//!
//! Set the `IONQ_API_KEY` environment variable, or put `api_key` in
//! `~/.arvak/ionq.yaml`:
//!
//! ```bash
//! export IONQ_API_KEY="your-ionq-key"
//! ```
//!
//! Debug mode needs no key and never contacts the service.
//!
//! # Results
//!
//! IonQ returns a probability per basis-state index. The adapter scales
//! these by the shot count, rounds half-to-even and assigns the rounding
//! residual to the largest entry, so counts always sum to the shots
//! requested. Indices are read little-endian and reordered by the
//! circuit's measurement layout.
//!
//! # Example
//!
//! ```ignore
//! use arvak_adapter_ionq::{CompiledCircuit, IonqBackend, IonqCircuit, IonqGate};
//! use arvak_hal::{Backend, WaitOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = IonqBackend::new("simulator")?;
//!
//!     let body = IonqCircuit::new(2, vec![
//!         IonqGate::H { target: 0 },
//!         IonqGate::Cnot { control: 0, target: 1 },
//!     ]);
//!     let circuit = CompiledCircuit::new(body, vec![0, 1]);
//!
//!     let handle = backend.submit(&circuit, 100).await?;
//!     let result = backend.wait(&handle, &WaitOptions::default()).await?;
//!     println!("Results: {:?}", result.counts);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
mod backend;
pub mod circuit;
pub mod config;
mod error;
pub mod histogram;

pub use api::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
pub use backend::{DEBUG_JOB_PREFIX, DEVICES, IONQ_MAX_QUBITS, IonqBackend};
pub use circuit::{CompiledCircuit, IonqCircuit, IonqGate};
pub use config::IonqConfig;
pub use error::{IonqError, IonqResult};
