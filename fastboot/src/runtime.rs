//! The container runtime seam.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{FastbootError, FastbootResult};
use crate::util::{run_checked, run_output, status_ok};

/// Operations the orchestrator needs from the container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Names of all running containers.
    async fn list(&self) -> FastbootResult<Vec<String>>;

    /// Gracefully stop a container.
    async fn stop(&self, name: &str) -> FastbootResult<()>;

    /// Kill a container outright.
    async fn kill(&self, name: &str) -> FastbootResult<()>;

    /// Copy a host file into a container's filesystem namespace.
    async fn copy_into(
        &self,
        container: &str,
        host_path: &Path,
        container_path: &Path,
    ) -> FastbootResult<()>;

    /// Stop the runtime engine itself. Must complete cleanly; an abrupt
    /// kernel transfer over a half-stopped engine corrupts its storage.
    async fn stop_engine(&self) -> FastbootResult<()>;
}

/// Host implementation driving the `docker` CLI, with the engine managed as
/// a service unit.
pub struct DockerCli {
    docker: PathBuf,
    systemctl: PathBuf,
    engine_unit: String,
}

impl DockerCli {
    pub fn new() -> Self {
        DockerCli {
            docker: PathBuf::from("docker"),
            systemctl: PathBuf::from("systemctl"),
            engine_unit: "docker.service".to_string(),
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn list(&self) -> FastbootResult<Vec<String>> {
        let output = run_output(&self.docker, ["ps", "--format", "{{.Names}}"])
            .await
            .map_err(FastbootError::Runtime)?;
        status_ok(&self.docker, &output).map_err(FastbootError::Runtime)?;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }

    async fn stop(&self, name: &str) -> FastbootResult<()> {
        debug!(container = name, "stopping container");
        run_checked(&self.docker, ["stop", name])
            .await
            .map_err(FastbootError::Runtime)
    }

    async fn kill(&self, name: &str) -> FastbootResult<()> {
        debug!(container = name, "killing container");
        run_checked(&self.docker, ["kill", name])
            .await
            .map_err(FastbootError::Runtime)
    }

    async fn copy_into(
        &self,
        container: &str,
        host_path: &Path,
        container_path: &Path,
    ) -> FastbootResult<()> {
        let dest = format!("{}:{}", container, container_path.display());
        debug!(src = %host_path.display(), %dest, "copying into container");
        let args = [
            OsStr::new("cp"),
            host_path.as_os_str(),
            OsStr::new(dest.as_str()),
        ];
        run_checked(&self.docker, args)
            .await
            .map_err(FastbootError::Runtime)
    }

    async fn stop_engine(&self) -> FastbootResult<()> {
        debug!(unit = %self.engine_unit, "stopping container engine");
        run_checked(&self.systemctl, ["stop", self.engine_unit.as_str()])
            .await
            .map_err(FastbootError::EngineStop)
    }
}
