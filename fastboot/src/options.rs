//! Configuration for a fast-reboot run.
//!
//! All well-known paths and target names live here. The defaults describe a
//! stock SONiC-style switch image; a JSON file can override any subset of
//! fields for non-standard installs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{FastbootError, FastbootResult};

/// Options controlling a single orchestration run.
///
/// Every field has a serde-level default, so a config file only needs to name
/// the fields it changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RebootOptions {
    /// Kernel image staged into the transfer slot.
    #[serde(default = "default_kernel_image")]
    pub kernel_image: PathBuf,

    /// Initrd staged alongside the kernel.
    #[serde(default = "default_initrd_image")]
    pub initrd_image: PathBuf,

    /// Source of the running kernel's command line.
    #[serde(default = "default_cmdline_source")]
    pub cmdline_source: PathBuf,

    /// Token appended to the next boot's command line so the restore path
    /// can tell this boot came through the fast path.
    #[serde(default = "default_marker_token")]
    pub marker_token: String,

    /// Directory the forwarding-state dumper writes into.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Container that consumes the snapshot after the new kernel boots.
    #[serde(default = "default_snapshot_container")]
    pub snapshot_container: String,

    /// Destination directory inside the consumer container.
    #[serde(default = "default_snapshot_container_dir")]
    pub snapshot_container_dir: PathBuf,

    /// Dumper invocation; the snapshot directory is appended as the final
    /// argument.
    #[serde(default = "default_dumper_command")]
    pub dumper_command: Vec<String>,

    /// Containers left running during the drain phase.
    #[serde(default)]
    pub keep_containers: Vec<String>,

    /// Host service units stopped after the container drain, before the
    /// engine itself goes down.
    #[serde(default = "default_host_services")]
    pub host_services: Vec<String>,

    /// Machine config file the platform profile is resolved from.
    #[serde(default = "default_machine_conf")]
    pub machine_conf: PathBuf,

    /// Settle delay between the two sync passes, in milliseconds.
    #[serde(default = "default_settle_millis")]
    pub settle_millis: u64,
}

fn default_kernel_image() -> PathBuf {
    PathBuf::from("/boot/vmlinuz")
}

fn default_initrd_image() -> PathBuf {
    PathBuf::from("/boot/initrd.img")
}

fn default_cmdline_source() -> PathBuf {
    PathBuf::from("/proc/cmdline")
}

fn default_marker_token() -> String {
    "fast-reboot".to_string()
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("/host/fast-reboot")
}

fn default_snapshot_container() -> String {
    "swss".to_string()
}

fn default_snapshot_container_dir() -> PathBuf {
    PathBuf::from("/")
}

fn default_dumper_command() -> Vec<String> {
    vec!["fast-reboot-dump.py".to_string(), "-t".to_string()]
}

fn default_host_services() -> Vec<String> {
    vec![
        "snmp".to_string(),
        "dhcp_relay".to_string(),
        "hostcfgd".to_string(),
    ]
}

fn default_machine_conf() -> PathBuf {
    PathBuf::from("/host/machine.conf")
}

fn default_settle_millis() -> u64 {
    1000
}

impl Default for RebootOptions {
    fn default() -> Self {
        RebootOptions {
            kernel_image: default_kernel_image(),
            initrd_image: default_initrd_image(),
            cmdline_source: default_cmdline_source(),
            marker_token: default_marker_token(),
            snapshot_dir: default_snapshot_dir(),
            snapshot_container: default_snapshot_container(),
            snapshot_container_dir: default_snapshot_container_dir(),
            dumper_command: default_dumper_command(),
            keep_containers: Vec::new(),
            host_services: default_host_services(),
            machine_conf: default_machine_conf(),
            settle_millis: default_settle_millis(),
        }
    }
}

impl RebootOptions {
    /// Load options from a JSON file, filling unnamed fields with defaults.
    pub fn load(path: &Path) -> FastbootResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FastbootError::Config(format!("read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            FastbootError::Config(format!("parse {}: {}", path.display(), e))
        })
    }

    /// Settle delay as a [`Duration`].
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let opts = RebootOptions::default();
        assert_eq!(opts.marker_token, "fast-reboot");
        assert_eq!(opts.snapshot_container, "swss");
        assert_eq!(opts.settle(), Duration::from_secs(1));
        assert!(opts.keep_containers.is_empty());
    }

    #[test]
    fn test_load_partial_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"kernel_image": "/host/image/boot/vmlinuz-6.1", "settle_millis": 250}}"#
        )
        .unwrap();

        let opts = RebootOptions::load(file.path()).unwrap();
        assert_eq!(
            opts.kernel_image,
            PathBuf::from("/host/image/boot/vmlinuz-6.1")
        );
        assert_eq!(opts.settle(), Duration::from_millis(250));
        // Unnamed fields keep their defaults
        assert_eq!(opts.marker_token, "fast-reboot");
        assert_eq!(opts.host_services.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let result = RebootOptions::load(Path::new("/nonexistent/options.json"));
        assert!(matches!(result, Err(FastbootError::Config(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let result = RebootOptions::load(file.path());
        assert!(matches!(result, Err(FastbootError::Config(_))));
    }
}
