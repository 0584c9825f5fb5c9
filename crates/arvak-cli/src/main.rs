//! Arvak IonQ Command-Line Interface
//!
//! Submit IonQ-native circuits, follow their status and fetch results.
//!
//! ```text
//! arvak-ionq devices
//! arvak-ionq run -i bell.json -s 100 --device simulator
//! arvak-ionq run -i bell.json -s 100 --no-wait
//! arvak-ionq status <JOB_ID>
//! arvak-ionq result <JOB_ID> --timeout 600 --format json
//! arvak-ionq cancel <JOB_ID>
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::{BackendArgs, OutputFormat};
use commands::{cancel, devices, result, run, status};

/// Arvak IonQ - run circuits on IonQ trapped-ion hardware
#[derive(Parser)]
#[command(name = "arvak-ionq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Target device (qpu, simulator)
    #[arg(short, long, global = true, env = "IONQ_DEVICE")]
    device: Option<String>,

    /// Answer jobs locally without contacting IonQ
    #[arg(long, global = true)]
    debug: bool,

    /// Configuration file (default: ~/.arvak/ionq.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List IonQ devices
    Devices,

    /// Submit a circuit and (by default) wait for its result
    Run {
        /// Circuit file (IonQ JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Number of shots
        #[arg(short, long, default_value = "1024")]
        shots: u32,

        /// Job name (default: {label}_0)
        #[arg(short, long)]
        name: Option<String>,

        /// Save the job and return without waiting
        #[arg(long)]
        no_wait: bool,

        /// Give up waiting after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Query the status of a saved job
    Status {
        /// Job ID
        job_id: String,
    },

    /// Wait for a saved job and print its result
    Result {
        /// Job ID
        job_id: String,

        /// Give up waiting after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Cancel a saved job
    Cancel {
        /// Job ID
        job_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = BackendArgs {
        device: cli.device,
        debug: cli.debug,
        config: cli.config,
    };

    // Execute command
    let result = match cli.command {
        Commands::Devices => devices::execute(),

        Commands::Run {
            input,
            shots,
            name,
            no_wait,
            timeout,
            format,
        } => run::execute(&args, &input, shots, name, no_wait, timeout, format).await,

        Commands::Status { job_id } => status::execute(&args, &job_id).await,

        Commands::Result {
            job_id,
            timeout,
            format,
        } => result::execute(&args, &job_id, timeout, format).await,

        Commands::Cancel { job_id } => cancel::execute(&args, &job_id).await,
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
