//! Process and service control.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{FastbootError, FastbootResult};
use crate::util::{run_checked, run_output};

/// Ability to stop named service units and terminate named processes.
#[async_trait]
pub trait ServiceControl: Send + Sync {
    /// Stop a service unit.
    async fn stop_unit(&self, unit: &str) -> FastbootResult<()>;

    /// Send SIGKILL to every process with exactly this name.
    ///
    /// A name matching no running process is success: the target is gone
    /// either way.
    async fn kill_process(&self, name: &str) -> FastbootResult<()>;
}

/// Host implementation backed by `systemctl` and `pkill`.
pub struct SystemdControl {
    systemctl: PathBuf,
    pkill: PathBuf,
}

impl SystemdControl {
    pub fn new() -> Self {
        SystemdControl {
            systemctl: PathBuf::from("systemctl"),
            pkill: PathBuf::from("pkill"),
        }
    }
}

impl Default for SystemdControl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceControl for SystemdControl {
    async fn stop_unit(&self, unit: &str) -> FastbootResult<()> {
        debug!(unit, "stopping service unit");
        run_checked(&self.systemctl, ["stop", unit])
            .await
            .map_err(FastbootError::Service)
    }

    async fn kill_process(&self, name: &str) -> FastbootResult<()> {
        debug!(process = name, "killing process by name");
        let output = run_output(&self.pkill, ["-9", "-x", name])
            .await
            .map_err(FastbootError::Service)?;

        // pkill exits 1 when nothing matched
        match output.status.code() {
            Some(0) | Some(1) => Ok(()),
            _ => Err(FastbootError::Service(format!(
                "pkill -9 -x {} exited with {}: {}",
                name,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}
