//! Result command implementation.
//!
//! Wait for a saved job and display its result.

use anyhow::Result;
use console::style;

use arvak_hal::Backend;

use super::common::{
    BackendArgs, JobStore, OutputFormat, build_backend, print_result, spinner, wait_options,
};

/// Execute the result command.
pub async fn execute(
    args: &BackendArgs,
    job_id: &str,
    timeout: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let handle = JobStore::open_default()?.load(job_id)?;
    let backend = build_backend(args)?;

    eprintln!(
        "{} Fetching results for job {}",
        style("→").cyan().bold(),
        style(job_id).dim()
    );

    let progress = spinner(format!("Waiting for job {job_id}..."));
    let result = backend.wait(&handle, &wait_options(timeout)).await;
    progress.finish_and_clear();

    print_result(job_id, &result?, format)
}
