//! Cloud Workstations bootstrap CLI.
//!
//! This CLI enables the required APIs, creates service accounts, buckets,
//! the image registry and network, builds the workstation image and
//! provisions the workstation cluster, config and instance.

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use ws_bootstrap::config::{DEFAULT_CONFIG_FILE, KEY_GCLOUD};
use ws_bootstrap::{bootstrap, ui, BootstrapConfig, ProvisionError, RunReport};
use ws_cloud::gcp::{Gcloud, ProcessRunner};

/// Cloud Workstations environment bootstrap.
#[derive(Parser)]
#[command(
    name = "ws-bootstrap",
    version,
    about = "Provision a Cloud Workstations development environment",
    long_about = "Provision a Cloud Workstations development environment.\n\n\
                  Every resource is created only if it does not already exist,\n\
                  so re-running the command is safe. The run stops at the first\n\
                  failure; fix the cause and run it again."
)]
struct Cli {
    /// Configuration file with KEY=value lines (PROJECT_ID is required).
    #[arg(
        short,
        long,
        env = "WS_BOOTSTRAP_CONFIG",
        default_value = DEFAULT_CONFIG_FILE,
        value_name = "FILE"
    )]
    config: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("info,ws_bootstrap=debug,ws_cloud=debug")
    } else {
        EnvFilter::new("warn,ws_bootstrap=info,ws_cloud=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    ui::print_section("Cloud Workstations Bootstrap");

    let mut report = RunReport::new();
    let result = bootstrap(&cli.config, connect, &mut report).await;
    if !report.results.is_empty() {
        report.print_summary();
    }
    let config = result?;

    ui::print_success("Workstation environment is ready");
    ui::print_info(&format!(
        "Connect with: gcloud workstations start {} --cluster={} --config={} --region={} --project={}",
        config.workstation_name,
        config.cluster_name,
        config.config_name,
        config.region,
        config.project_id
    ));
    Ok(())
}

/// Build the gcloud-backed control plane for a validated configuration.
fn connect(config: &BootstrapConfig) -> Result<Gcloud, ProvisionError> {
    let program = Gcloud::locate(&config.gcloud).map_err(|e| ProvisionError::ConfigInvalid {
        key: KEY_GCLOUD.to_string(),
        reason: e.to_string(),
    })?;
    debug!(gcloud = %program.display(), project = %config.project_id, "Using gcloud");
    Ok(Gcloud::with_runner(program, &config.project_id, ProcessRunner))
}
