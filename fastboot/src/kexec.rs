//! The kernel-transfer seam.
//!
//! [`KexecBackend`] is the host facility that stages and executes a new
//! kernel; [`KexecSlot`] wraps it so the single staged-image slot is an
//! explicit resource with a guarded lifecycle: `ensure_unloaded` →
//! `load` → `execute`. At most one staged transfer exists at any time as
//! observed through the slot.

use std::convert::Infallible;
use std::ffi::OsString;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::boot::BootImage;
use crate::errors::{FastbootError, FastbootResult};
use crate::util::run_checked;

/// Host facility that stages and jumps to a new kernel image in memory.
#[async_trait]
pub trait KexecBackend: Send + Sync {
    /// Whether a kernel is currently staged for transfer.
    async fn is_loaded(&self) -> FastbootResult<bool>;

    /// Unload a staged kernel.
    async fn unload(&self) -> FastbootResult<()>;

    /// Stage `image` into the transfer slot.
    async fn load(&self, image: &BootImage) -> FastbootResult<()>;

    /// Jump to the staged kernel. Does not return on success; the only
    /// observable outcome is the error.
    async fn execute(&self) -> FastbootResult<Infallible>;
}

/// Guarded handle over the backend's single staged-image slot.
pub struct KexecSlot<'a> {
    backend: &'a dyn KexecBackend,
}

impl<'a> KexecSlot<'a> {
    pub fn new(backend: &'a dyn KexecBackend) -> Self {
        KexecSlot { backend }
    }

    /// Clear any transfer staged by a previous run.
    ///
    /// Staging on top of an existing image is undefined; a failed unload
    /// here is fatal.
    pub async fn ensure_unloaded(&self) -> FastbootResult<()> {
        if self.backend.is_loaded().await? {
            info!("clearing kernel staged by a previous run");
            self.backend.unload().await?;
        }
        Ok(())
    }

    /// Stage `image`. Reversible until [`execute`](Self::execute).
    pub async fn load(&self, image: &BootImage) -> FastbootResult<()> {
        info!(
            kernel = %image.kernel.display(),
            append = %image.append_line(),
            "staging kernel for transfer"
        );
        self.backend.load(image).await
    }

    /// Hand control to the staged kernel.
    pub async fn execute(&self) -> FastbootResult<Infallible> {
        self.backend.execute().await
    }
}

/// Backend driving the kernel's kexec facility: the sysfs staging flag plus
/// the `kexec` userspace loader.
pub struct SysKexec {
    kexec_bin: PathBuf,
    loaded_flag: PathBuf,
}

impl SysKexec {
    pub fn new() -> Self {
        SysKexec {
            kexec_bin: PathBuf::from("/sbin/kexec"),
            loaded_flag: PathBuf::from("/sys/kernel/kexec_loaded"),
        }
    }

    /// Override the binary and sysfs flag locations.
    pub fn with_paths(kexec_bin: PathBuf, loaded_flag: PathBuf) -> Self {
        SysKexec {
            kexec_bin,
            loaded_flag,
        }
    }

    async fn kexec(&self, args: Vec<OsString>) -> FastbootResult<()> {
        debug!(bin = %self.kexec_bin.display(), ?args, "invoking kexec");
        run_checked(&self.kexec_bin, args)
            .await
            .map_err(FastbootError::Kexec)
    }
}

impl Default for SysKexec {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KexecBackend for SysKexec {
    async fn is_loaded(&self) -> FastbootResult<bool> {
        let raw = tokio::fs::read_to_string(&self.loaded_flag)
            .await
            .map_err(|e| {
                FastbootError::Kexec(format!(
                    "read {}: {}",
                    self.loaded_flag.display(),
                    e
                ))
            })?;
        Ok(raw.trim() == "1")
    }

    async fn unload(&self) -> FastbootResult<()> {
        self.kexec(vec![OsString::from("-u")]).await
    }

    async fn load(&self, image: &BootImage) -> FastbootResult<()> {
        let mut initrd = OsString::from("--initrd=");
        initrd.push(&image.initrd);
        let mut append = OsString::from("--append=");
        append.push(image.append_line());

        self.kexec(vec![
            OsString::from("-l"),
            image.kernel.clone().into_os_string(),
            initrd,
            append,
        ])
        .await
    }

    async fn execute(&self) -> FastbootResult<Infallible> {
        // On success the machine is running the new kernel before this call
        // completes; reaching the line below means the transfer was refused.
        self.kexec(vec![OsString::from("-e")]).await?;
        Err(FastbootError::Kexec(
            "kexec -e returned without transferring control".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn backend_with_flag(contents: &str) -> (TempDir, SysKexec) {
        let dir = TempDir::new().unwrap();
        let flag = dir.path().join("kexec_loaded");
        fs::write(&flag, contents).unwrap();
        let backend = SysKexec::with_paths(PathBuf::from("/sbin/kexec"), flag);
        (dir, backend)
    }

    #[tokio::test]
    async fn test_is_loaded_set() {
        let (_dir, backend) = backend_with_flag("1\n");
        assert!(backend.is_loaded().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_loaded_clear() {
        let (_dir, backend) = backend_with_flag("0\n");
        assert!(!backend.is_loaded().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_loaded_missing_flag_is_kexec_error() {
        let backend = SysKexec::with_paths(
            PathBuf::from("/sbin/kexec"),
            PathBuf::from("/nonexistent/kexec_loaded"),
        );
        assert!(matches!(
            backend.is_loaded().await,
            Err(FastbootError::Kexec(_))
        ));
    }
}
