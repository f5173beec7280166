//! Platform profile resolution and the per-ASIC drain plan.
//!
//! Some platforms run ASIC driver services adjacent to the kernel that must
//! be stopped before the transfer; which ones is a property of the machine,
//! resolved once per run from the host's machine config.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{FastbootError, FastbootResult};
use crate::shutdown::{ShutdownStep, StepAction};

/// ASIC/platform identity, resolved once per run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformProfile {
    pub asic: String,
}

impl PlatformProfile {
    pub fn new(asic: impl Into<String>) -> Self {
        PlatformProfile { asic: asic.into() }
    }

    /// Profile used when resolution fails; gates nothing.
    pub fn unknown() -> Self {
        PlatformProfile::new("unknown")
    }
}

/// Read-only source of the platform profile.
#[async_trait]
pub trait PlatformSource: Send + Sync {
    async fn resolve(&self) -> FastbootResult<PlatformProfile>;
}

/// Profile source parsing `key=value` lines of the machine config file.
pub struct MachineConf {
    path: PathBuf,
}

impl MachineConf {
    pub fn new(path: PathBuf) -> Self {
        MachineConf { path }
    }
}

#[async_trait]
impl PlatformSource for MachineConf {
    async fn resolve(&self) -> FastbootResult<PlatformProfile> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            FastbootError::Platform(format!("read {}: {}", self.path.display(), e))
        })?;

        let asic = parse_asic(&raw).ok_or_else(|| {
            FastbootError::Platform(format!(
                "no asic_type entry in {}",
                self.path.display()
            ))
        })?;

        debug!(asic, "resolved platform profile");
        Ok(PlatformProfile::new(asic))
    }
}

/// Extract the `asic_type` value from machine config contents.
fn parse_asic(raw: &str) -> Option<String> {
    raw.lines()
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == "asic_type")
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Broadcom switches load the opennsl kernel modules; they hold the ASIC and
// must be stopped before the transfer.
const BROADCOM_PLAN: &[ShutdownStep] = &[ShutdownStep {
    target: "opennsl-modules.service",
    action: StepAction::StopUnit,
}];

/// Drain plan for `profile`. Empty for platforms without kernel-adjacent
/// ASIC services.
pub fn drain_plan(profile: &PlatformProfile) -> &'static [ShutdownStep] {
    match profile.asic.as_str() {
        "broadcom" => BROADCOM_PLAN,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_asic() {
        let raw = "onie_platform=x86_64-acme_sw42-r0\nasic_type=broadcom\n";
        assert_eq!(parse_asic(raw).as_deref(), Some("broadcom"));
    }

    #[test]
    fn test_parse_asic_trims_whitespace() {
        assert_eq!(parse_asic("asic_type = mellanox \n").as_deref(), Some("mellanox"));
    }

    #[test]
    fn test_parse_asic_missing_key() {
        assert_eq!(parse_asic("onie_platform=x86_64\n"), None);
        assert_eq!(parse_asic("asic_type=\n"), None);
    }

    #[test]
    fn test_drain_plan_gated_on_asic() {
        let plan = drain_plan(&PlatformProfile::new("broadcom"));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].target, "opennsl-modules.service");

        assert!(drain_plan(&PlatformProfile::new("mellanox")).is_empty());
        assert!(drain_plan(&PlatformProfile::unknown()).is_empty());
    }

    #[tokio::test]
    async fn test_machine_conf_resolve() {
        let dir = TempDir::new().unwrap();
        let conf = dir.path().join("machine.conf");
        fs::write(&conf, "asic_type=broadcom\nplatform=acme\n").unwrap();

        let profile = MachineConf::new(conf).resolve().await.unwrap();
        assert_eq!(profile, PlatformProfile::new("broadcom"));
    }

    #[tokio::test]
    async fn test_machine_conf_missing_file() {
        let source = MachineConf::new(PathBuf::from("/nonexistent/machine.conf"));
        assert!(matches!(
            source.resolve().await,
            Err(FastbootError::Platform(_))
        ));
    }
}
