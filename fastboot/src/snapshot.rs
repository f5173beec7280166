//! Forwarding-state snapshot capture.
//!
//! The dumper writes the learned ARP and FDB tables to a well-known
//! directory; the capture then stages both files into the container that
//! restores them after the new kernel boots. The snapshot contents are
//! opaque to this crate.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{FastbootError, FastbootResult};
use crate::options::RebootOptions;
use crate::runtime::ContainerRuntime;
use crate::util::run_checked;

/// File the dumper writes the ARP table to, relative to the snapshot dir.
pub const ARP_FILE: &str = "arp.json";
/// File the dumper writes the FDB table to, relative to the snapshot dir.
pub const FDB_FILE: &str = "fdb.json";

/// External process that dumps the current forwarding state into a
/// directory.
#[async_trait]
pub trait StateDumper: Send + Sync {
    async fn dump(&self, dir: &Path) -> FastbootResult<()>;
}

/// Dumper invoked as a subprocess; the target directory is appended as the
/// final argument.
pub struct CommandDumper {
    command: Vec<String>,
}

impl CommandDumper {
    pub fn new(command: Vec<String>) -> Self {
        CommandDumper { command }
    }
}

#[async_trait]
impl StateDumper for CommandDumper {
    async fn dump(&self, dir: &Path) -> FastbootResult<()> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| FastbootError::Snapshot("empty dumper command".to_string()))?;

        let mut argv: Vec<&std::ffi::OsStr> =
            args.iter().map(|a| std::ffi::OsStr::new(a)).collect();
        argv.push(dir.as_os_str());

        debug!(program, dir = %dir.display(), "running forwarding-state dumper");
        run_checked(Path::new(program), argv)
            .await
            .map_err(FastbootError::Snapshot)
    }
}

/// A captured snapshot, staged into its consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateSnapshot {
    pub arp_path: PathBuf,
    pub fdb_path: PathBuf,
    /// Container the files were copied into.
    pub container: String,
}

/// Dump the ARP/FDB tables and stage them into the consumer container.
///
/// Callers treat failure as a degraded outcome, not an abort: a lost
/// snapshot slows post-boot convergence but does not make the reboot unsafe.
pub async fn capture(
    opts: &RebootOptions,
    dumper: &dyn StateDumper,
    runtime: &dyn ContainerRuntime,
) -> FastbootResult<StateSnapshot> {
    tokio::fs::create_dir_all(&opts.snapshot_dir)
        .await
        .map_err(|e| {
            FastbootError::Snapshot(format!(
                "create {}: {}",
                opts.snapshot_dir.display(),
                e
            ))
        })?;

    dumper.dump(&opts.snapshot_dir).await?;

    let arp_path = opts.snapshot_dir.join(ARP_FILE);
    let fdb_path = opts.snapshot_dir.join(FDB_FILE);

    for path in [&arp_path, &fdb_path] {
        runtime
            .copy_into(&opts.snapshot_container, path, &opts.snapshot_container_dir)
            .await
            .map_err(|e| {
                FastbootError::Snapshot(format!(
                    "stage {} into {}: {}",
                    path.display(),
                    opts.snapshot_container,
                    e
                ))
            })?;
    }

    Ok(StateSnapshot {
        arp_path,
        fdb_path,
        container: opts.snapshot_container.clone(),
    })
}
