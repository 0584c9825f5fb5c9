//! Cancel command implementation.

use anyhow::Result;
use console::style;

use arvak_hal::Backend;

use super::common::{BackendArgs, JobStore, build_backend};

/// Execute the cancel command.
pub async fn execute(args: &BackendArgs, job_id: &str) -> Result<()> {
    let handle = JobStore::open_default()?.load(job_id)?;
    let backend = build_backend(args)?;

    backend.cancel(&handle).await?;

    println!(
        "{} Cancellation requested for job {}",
        style("✓").green().bold(),
        style(job_id).cyan()
    );
    Ok(())
}
