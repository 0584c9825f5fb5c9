//! Status command implementation.
//!
//! Query the status of a job saved by `run --no-wait`.

use anyhow::Result;
use console::style;

use arvak_hal::{Backend, JobStatus};

use super::common::{BackendArgs, JobStore, build_backend};

/// Execute the status command.
pub async fn execute(args: &BackendArgs, job_id: &str) -> Result<()> {
    let handle = JobStore::open_default()?.load(job_id)?;
    let backend = build_backend(args)?;

    let status = backend.status(&handle).await?;

    let status_name = status.name();
    let status_styled = match status {
        JobStatus::Completed => style(status_name).green().bold(),
        JobStatus::Error(_) | JobStatus::Cancelled => style(status_name).red().bold(),
        JobStatus::Submitted => style(status_name).yellow().bold(),
        JobStatus::Running => style(status_name).cyan().bold(),
    };

    println!("{} Job {}", style("→").cyan().bold(), style(job_id).dim());
    println!("  Status: {status_styled}");
    println!("  Shots:  {}", handle.shots());
    if let JobStatus::Error(ref msg) = status {
        println!("  Error:  {}", style(msg).red());
    }
    if status.is_pending() {
        println!(
            "\n  Wait for the result with: {}",
            style(format!("arvak-ionq result {job_id}")).bold()
        );
    }

    Ok(())
}
