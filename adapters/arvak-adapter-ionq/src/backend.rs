//! IonQ backend implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use arvak_hal::{
    Backend, Capabilities, Counts, ExecutionResult, HalError, HalResult, JobHandle, JobStatus,
    Outcome, ResultCache, ValidationResult,
};

use crate::api::{HttpTransport, IonqClient, JobResponse, RemoteStatus, SubmitRequest, Transport};
use crate::circuit::CompiledCircuit;
use crate::config::IonqConfig;
use crate::error::{IonqError, IonqResult};
use crate::histogram::{decode_counts, parse_histogram, reconstruct};

/// IonQ API constraint: maximum qubits per circuit.
pub const IONQ_MAX_QUBITS: u32 = 11;

/// Job id prefix of debug-mode handles; the qubit count follows it.
pub const DEBUG_JOB_PREFIX: &str = "_MACHINE_DEBUG_";

/// Devices this adapter can target.
pub const DEVICES: [&str; 2] = ["qpu", "simulator"];

/// IonQ trapped-ion backend.
///
/// Submits IonQ-native circuits to the jobs API, polls their status and
/// decodes histograms into counts. Results are cached per handle and
/// decoded at most once.
///
/// # Authentication
///
/// An API key is taken from, in order: the config passed in, `IONQ_API_KEY`,
/// or `api_key` in `~/.arvak/ionq.yaml`.
///
/// # Debug mode
///
/// With `debug` set, nothing is sent to the service. Every job completes
/// immediately with the all-zero outcome for every shot.
///
/// # Example
///
/// ```ignore
/// use arvak_adapter_ionq::IonqBackend;
/// use arvak_hal::{Backend, WaitOptions};
///
/// let backend = IonqBackend::new("simulator")?;
/// let handle = backend.submit(&circuit, 100).await?;
/// let result = backend.wait(&handle, &WaitOptions::default()).await?;
/// ```
pub struct IonqBackend {
    client: IonqClient,
    device: String,
    label: String,
    debug: bool,
    capabilities: Capabilities,
    cache: ResultCache,
}

impl std::fmt::Debug for IonqBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IonqBackend")
            .field("device", &self.device)
            .field("label", &self.label)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl IonqBackend {
    /// Create a backend for `device`, loading the config file and
    /// environment.
    pub fn new(device: impl Into<String>) -> IonqResult<Self> {
        Self::from_config(IonqConfig::load(None)?.with_device(device))
    }

    /// Create a backend from an explicit configuration.
    ///
    /// Fails with [`IonqError::MissingApiKey`] unless debug mode is on.
    pub fn from_config(config: IonqConfig) -> IonqResult<Self> {
        let api_key = match config.require_api_key() {
            Ok(key) => key.to_string(),
            Err(_) if config.debug => String::new(),
            Err(e) => return Err(e),
        };
        let transport =
            HttpTransport::with_base_url(&config.base_url, api_key, config.request_timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a backend that talks through `transport`.
    pub fn with_transport(config: IonqConfig, transport: Arc<dyn Transport>) -> IonqResult<Self> {
        if !DEVICES.contains(&config.device.as_str()) {
            return Err(IonqError::Config(format!(
                "unknown IonQ device '{}' (expected one of: {})",
                config.device,
                DEVICES.join(", ")
            )));
        }

        Ok(Self {
            client: IonqClient::new(transport),
            capabilities: device_capabilities(&config.device),
            device: config.device,
            label: config.label,
            debug: config.debug,
            cache: ResultCache::new(),
        })
    }

    /// Share a result cache with other backends.
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Capabilities of every device this adapter can target.
    pub fn available_devices() -> Vec<Capabilities> {
        DEVICES.iter().copied().map(device_capabilities).collect()
    }

    /// Submit several circuits, each with its own shot count.
    ///
    /// Jobs without an explicit name are called `{label}_{index}`. Stops at
    /// the first failure; handles for earlier jobs are dropped but stay in
    /// the cache.
    #[instrument(skip(self, jobs), fields(device = %self.device, count = jobs.len()))]
    pub async fn submit_batch(&self, jobs: &[(CompiledCircuit, u32)]) -> HalResult<Vec<JobHandle>> {
        let mut handles = Vec::with_capacity(jobs.len());
        for (index, (circuit, shots)) in jobs.iter().enumerate() {
            handles.push(self.submit_indexed(circuit, *shots, index).await?);
        }
        Ok(handles)
    }

    fn job_name(&self, circuit: &CompiledCircuit, index: usize) -> String {
        circuit
            .name
            .clone()
            .unwrap_or_else(|| format!("{}_{index}", self.label))
    }

    async fn submit_indexed(
        &self,
        circuit: &CompiledCircuit,
        shots: u32,
        index: usize,
    ) -> HalResult<JobHandle> {
        if let ValidationResult::Invalid { reasons } = self.validate(circuit).await? {
            return Err(HalError::InvalidCircuit(reasons.join("; ")));
        }

        let job_id = if self.debug {
            format!("{DEBUG_JOB_PREFIX}{}", circuit.num_qubits())
        } else {
            let name = self.job_name(circuit, index);
            let request = SubmitRequest::new(circuit.body.clone(), &self.device, shots, &name);
            let response = self.client.submit_job(&request).await?;
            submission_id(response)?
        };

        let handle = JobHandle::new(
            job_id,
            shots,
            circuit.measurements.clone(),
            circuit.postprocess.clone(),
        );

        if circuit.measurements.is_empty() {
            // Nothing is measured, so the outcome is known without the service.
            let counts = Counts::from_pairs([(Outcome::zeros(0), u64::from(shots))]);
            let result = ExecutionResult::new(counts, shots)
                .with_postprocess(circuit.postprocess.clone());
            self.cache.register_completed(&handle, result).await;
        } else {
            self.cache.register(&handle).await;
        }

        info!("Submitted IonQ job {} ({} shots)", handle, shots);
        Ok(handle)
    }
}

/// Capabilities for a named device.
fn device_capabilities(device: &str) -> Capabilities {
    Capabilities::ionq(device, IONQ_MAX_QUBITS, device == "simulator")
}

/// Job id from a submission response, or why there is none.
fn submission_id(response: JobResponse) -> HalResult<String> {
    if let Some(msg) = response.error_message() {
        return Err(HalError::SubmissionFailed(msg));
    }
    if matches!(response.remote_status(), Ok(RemoteStatus::Failed)) {
        return Err(HalError::SubmissionFailed(
            "Unknown error while submitting job.".into(),
        ));
    }
    if let Some(status) = response.rejected_status() {
        return Err(HalError::SubmissionFailed(format!(
            "IonQ rejected the submission (HTTP {status})"
        )));
    }
    response
        .id
        .ok_or_else(|| HalError::Protocol("submission response has no job id".into()))
}

/// Result for a debug-mode handle: every shot reads all zeros.
fn debug_result(handle: &JobHandle) -> HalResult<ExecutionResult> {
    let job_id = handle.job_id();
    let n_qubits: usize = job_id
        .strip_prefix(DEBUG_JOB_PREFIX)
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| IonqError::InvalidDebugJobId(job_id.to_string()))?;

    let counts = Counts::from_pairs([(Outcome::zeros(n_qubits), u64::from(handle.shots()))]);
    Ok(ExecutionResult::new(counts, handle.shots())
        .with_postprocess(handle.postprocess().map(str::to_string)))
}

/// Decode the histogram of a completed job.
fn decode_completed(handle: &JobHandle, response: &JobResponse) -> HalResult<ExecutionResult> {
    let width = response.qubits.ok_or_else(|| {
        IonqError::MalformedResponse("completed job has no qubit count".into())
    })?;
    let raw = response
        .data
        .as_ref()
        .and_then(|d| d.histogram.as_ref())
        .ok_or_else(|| IonqError::MalformedResponse("completed job has no histogram".into()))?;

    let histogram = parse_histogram(raw)?;
    let reconstructed = reconstruct(&histogram, u64::from(handle.shots()))?;
    let counts = decode_counts(&reconstructed, width as usize, handle.measure_permutation())?;

    Ok(ExecutionResult::new(counts, handle.shots())
        .with_postprocess(handle.postprocess().map(str::to_string)))
}

#[async_trait]
impl Backend for IonqBackend {
    type Circuit = CompiledCircuit;

    fn name(&self) -> &str {
        &self.device
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn cache(&self) -> &ResultCache {
        &self.cache
    }

    async fn validate(&self, circuit: &CompiledCircuit) -> HalResult<ValidationResult> {
        let mut reasons = circuit.problems(self.capabilities.num_qubits);
        for gate in &circuit.body.circuit {
            if !self.capabilities.gate_set.contains(gate.name()) {
                reasons.push(format!("unsupported gate '{}'", gate.name()));
            }
        }
        Ok(ValidationResult::from_reasons(reasons))
    }

    #[instrument(skip(self, circuit), fields(device = %self.device))]
    async fn submit(&self, circuit: &CompiledCircuit, shots: u32) -> HalResult<JobHandle> {
        self.submit_indexed(circuit, shots, 0).await
    }

    #[instrument(skip(self), fields(job = %handle))]
    async fn status(&self, handle: &JobHandle) -> HalResult<JobStatus> {
        if self.cache.is_populated(handle).await {
            return Ok(JobStatus::Completed);
        }

        if self.debug {
            self.cache
                .populate_with(handle, || debug_result(handle))
                .await?;
            return Ok(JobStatus::Completed);
        }

        let response = self.client.get_job(handle.job_id()).await?;
        let status = response.job_status()?;
        match status {
            JobStatus::Completed => {
                self.cache
                    .populate_with(handle, || decode_completed(handle, &response))
                    .await?;
                info!("IonQ job {} completed", handle);
            }
            JobStatus::Error(ref msg) => warn!("IonQ job {} failed: {}", handle, msg),
            _ => debug!("IonQ job {} is {}", handle, status),
        }
        Ok(status)
    }

    #[instrument(skip(self), fields(job = %handle))]
    async fn cancel(&self, handle: &JobHandle) -> HalResult<()> {
        if self.debug {
            debug!("Debug mode: nothing to cancel for {}", handle);
            return Ok(());
        }

        let response = self.client.cancel_job(handle.job_id()).await?;
        if let Some(msg) = response.error_message() {
            return Err(HalError::CancellationFailed(msg));
        }
        if matches!(response.remote_status(), Ok(RemoteStatus::Failed)) {
            return Err(HalError::CancellationFailed(
                "Unknown error while cancelling job.".into(),
            ));
        }
        if let Some(status) = response.rejected_status() {
            return Err(HalError::CancellationFailed(format!(
                "IonQ rejected the cancellation (HTTP {status})"
            )));
        }

        info!("Cancelled IonQ job {}", handle);
        Ok(())
    }
}
