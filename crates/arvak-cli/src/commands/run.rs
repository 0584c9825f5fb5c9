//! Run command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use arvak_hal::Backend;

use super::common::{
    BackendArgs, JobStore, OutputFormat, build_backend, load_circuit, print_result, spinner,
    wait_options,
};

/// Execute the run command.
pub async fn execute(
    args: &BackendArgs,
    input: &Path,
    shots: u32,
    name: Option<String>,
    no_wait: bool,
    timeout: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let backend = build_backend(args)?;

    let mut circuit = load_circuit(input)?;
    if let Some(name) = name {
        circuit = circuit.with_name(name);
    }

    eprintln!(
        "{} Running {} on {}{} ({} shots)",
        style("→").cyan().bold(),
        style(input.display()).green(),
        style(backend.device()).yellow(),
        if backend.is_debug() { " [debug]" } else { "" },
        shots
    );
    eprintln!(
        "  Loaded: {} qubits, {} gates, {} measured",
        circuit.num_qubits(),
        circuit.body.circuit.len(),
        circuit.measurements.len()
    );

    let progress = spinner("Submitting job...");
    let handle = match backend.submit(&circuit, shots).await {
        Ok(handle) => handle,
        Err(e) => {
            progress.finish_and_clear();
            return Err(e.into());
        }
    };

    if no_wait {
        progress.finish_and_clear();
        let path = JobStore::open_default()?.save(&handle)?;
        eprintln!(
            "{} Submitted job {} (saved to {})",
            style("✓").green().bold(),
            style(handle.job_id()).cyan(),
            path.display()
        );
        println!("{}", handle.job_id());
        return Ok(());
    }

    progress.set_message(format!("Waiting for job {handle}..."));
    let result = backend.wait(&handle, &wait_options(timeout)).await;
    progress.finish_and_clear();

    match result {
        Ok(result) => print_result(handle.job_id(), &result, format),
        Err(e) if e.is_transient() => {
            // Keep the job so it can be resumed with `result`.
            JobStore::open_default()?.save(&handle)?;
            anyhow::bail!(
                "{e}. Use 'arvak-ionq result {}' to check later.",
                handle.job_id()
            )
        }
        Err(e) => Err(e.into()),
    }
}
