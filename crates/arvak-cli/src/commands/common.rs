//! Shared helpers for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use arvak_adapter_ionq::{CompiledCircuit, IonqBackend, IonqConfig};
use arvak_hal::{ExecutionResult, JobHandle, WaitOptions};

/// Backend selection flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct BackendArgs {
    pub device: Option<String>,
    pub debug: bool,
    pub config: Option<PathBuf>,
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Build a backend from the config file, environment and flags.
pub fn build_backend(args: &BackendArgs) -> Result<IonqBackend> {
    let mut config = IonqConfig::load(args.config.as_deref())?;
    if let Some(ref device) = args.device {
        config = config.with_device(device);
    }
    if args.debug {
        config = config.with_debug(true);
    }
    debug!("IonQ backend config: {:?}", config);
    Ok(IonqBackend::from_config(config)?)
}

/// Load an IonQ-native circuit from a JSON file.
pub fn load_circuit(path: &Path) -> Result<CompiledCircuit> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("Invalid IonQ circuit in {}", path.display()))
}

/// Saved job handles under `~/.arvak/ionq-jobs/`.
pub struct JobStore {
    dir: PathBuf,
}

impl JobStore {
    /// Store rooted at `dir`, created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the default state directory.
    pub fn open_default() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(Self::new(home.join(".arvak").join("ionq-jobs")))
    }

    fn path_for(&self, job_id: &str) -> Result<PathBuf> {
        if job_id.is_empty() || job_id.contains(['/', '\\']) || job_id.starts_with('.') {
            anyhow::bail!("Invalid job ID '{job_id}'");
        }
        Ok(self.dir.join(format!("{job_id}.json")))
    }

    pub fn save(&self, handle: &JobHandle) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path_for(handle.job_id())?;
        fs::write(&path, serde_json::to_string_pretty(handle)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn load(&self, job_id: &str) -> Result<JobHandle> {
        let path = self.path_for(job_id)?;
        let contents = fs::read_to_string(&path).with_context(|| {
            format!("Unknown job '{job_id}'. Submit it with 'arvak-ionq run --no-wait' first.")
        })?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Corrupt job record {}", path.display()))
    }
}

/// Wait policy for an optional timeout in seconds.
pub fn wait_options(timeout: Option<u64>) -> WaitOptions {
    match timeout {
        Some(secs) => WaitOptions::new().with_timeout(Duration::from_secs(secs)),
        None => WaitOptions::new(),
    }
}

/// Spinner shown while talking to the service.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Result as a JSON document.
pub fn results_json(job_id: &str, result: &ExecutionResult) -> serde_json::Value {
    let counts: serde_json::Map<String, serde_json::Value> = result
        .counts
        .sorted()
        .into_iter()
        .map(|(outcome, count)| (outcome.to_string(), (*count).into()))
        .collect();
    serde_json::json!({
        "job_id": job_id,
        "shots": result.shots,
        "counts": counts,
        "postprocess": result.postprocess,
    })
}

/// Print a result in the requested format.
pub fn print_result(job_id: &str, result: &ExecutionResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results_json(job_id, result))?);
        }
        OutputFormat::Table => print_results(result),
    }
    Ok(())
}

/// Print execution results in a table format.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn print_results(result: &ExecutionResult) {
    println!(
        "\n{} Results ({} shots):",
        style("✓").green().bold(),
        result.shots
    );

    let sorted = result.counts.sorted();
    let total = result.counts.total_shots().max(1) as f64;

    for (outcome, count) in sorted.iter().take(16) {
        let prob = **count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(outcome).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }

    if let Some(ref descriptor) = result.postprocess {
        println!("\n  Post-processing: {}", style(descriptor).yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_hal::{Counts, Outcome};
    use std::io::Write;

    #[test]
    fn test_job_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("jobs"));
        let handle = JobHandle::new("abc-123", 100, vec![1, 0], Some("parity".into()));

        let path = store.save(&handle).unwrap();
        assert!(path.ends_with("abc-123.json"));
        assert_eq!(store.load("abc-123").unwrap(), handle);
    }

    #[test]
    fn test_job_store_unknown_job() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path());
        let err = store.load("missing").unwrap_err();
        assert!(err.to_string().contains("Unknown job 'missing'"));
    }

    #[test]
    fn test_job_store_rejects_paths() {
        let store = JobStore::new("/tmp/unused");
        assert!(store.load("../etc/passwd").is_err());
        assert!(store.load("").is_err());
    }

    #[test]
    fn test_load_circuit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"body": {{"qubits": 2, "circuit": [{{"gate": "h", "target": 0}}]}}, "measurements": [0, 1]}}"#
        )
        .unwrap();

        let circuit = load_circuit(file.path()).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.measurements, vec![0, 1]);
        assert!(circuit.name.is_none());
    }

    #[test]
    fn test_load_circuit_missing_file() {
        let err = load_circuit(Path::new("/nonexistent/bell.json")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_wait_options() {
        assert_eq!(wait_options(None).timeout, None);
        assert_eq!(wait_options(Some(5)).timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_results_json() {
        let counts = Counts::from_pairs([
            (Outcome::from_bits([false, false]), 3),
            (Outcome::from_bits([true, true]), 7),
        ]);
        let result = ExecutionResult::new(counts, 10);
        let json = results_json("abc", &result);
        assert_eq!(json["job_id"], "abc");
        assert_eq!(json["shots"], 10);
        assert_eq!(json["counts"]["11"], 7);
        assert_eq!(json["counts"]["00"], 3);
        assert!(json["postprocess"].is_null());
    }

    #[test]
    fn test_build_backend_debug_without_key() {
        let config = write_config("label: cli\n");
        let args = BackendArgs {
            device: Some("simulator".into()),
            debug: true,
            config: Some(config.path().to_path_buf()),
        };
        let backend = build_backend(&args).unwrap();
        assert!(backend.is_debug());
        assert_eq!(backend.device(), "simulator");
        assert_eq!(backend.label(), "cli");
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }
}
