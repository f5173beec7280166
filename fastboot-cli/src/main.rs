//! `fast-reboot`: warm reboot for switch control planes.
//!
//! Stages the next kernel through kexec, snapshots forwarding state, tears
//! the control plane down in peer-safe order, and jumps to the new kernel.
//! A successful run does not return; any fatal error before the handoff
//! exits non-zero.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use fastboot::{Orchestrator, RebootOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fast-reboot",
    version,
    about = "Reboot into a new kernel without firmware re-initialization",
    long_about = "Performs a warm reboot: the next kernel is staged and executed \
                  directly from the running kernel via kexec, preserving learned \
                  ARP/FDB state and tearing down control-plane daemons in an \
                  order that hides the restart from routing and link-layer peers."
)]
struct Cli {
    /// JSON options file overriding the built-in defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Containers to leave running during the drain phase
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    keep: Vec<String>,
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut opts = match &cli.config {
        Some(path) => RebootOptions::load(path)?,
        None => RebootOptions::default(),
    };
    if !cli.keep.is_empty() {
        opts.keep_containers = cli.keep;
    }

    match Orchestrator::host(opts).run().await {
        // The success variant is uninhabited: control passed to the new
        // kernel and this process no longer exists.
        Ok(never) => match never {},
        Err(e) => {
            tracing::error!("fast reboot aborted: {}", e);
            process::exit(1);
        }
    }
}
