//! The reboot sequence.
//!
//! Strictly linear: each phase runs to completion (or fails fatally) before
//! the next begins. Fatal phases abort with an error; best-effort phases log
//! and continue, since a stuck daemon degrades post-boot convergence but does
//! not get to block the reboot.

use std::convert::Infallible;

use tracing::{debug, info, warn};

use crate::boot;
use crate::errors::FastbootResult;
use crate::kexec::{KexecBackend, KexecSlot, SysKexec};
use crate::options::RebootOptions;
use crate::platform::{self, MachineConf, PlatformProfile, PlatformSource};
use crate::privilege::{EffectiveUid, PrivilegeCheck};
use crate::runtime::{ContainerRuntime, DockerCli};
use crate::services::{ServiceControl, SystemdControl};
use crate::shutdown::{self, HostExecutor};
use crate::snapshot::{self, CommandDumper, StateDumper};
use crate::sync::{self, DiskSync, HostSync};

/// The external facilities the sequence drives.
///
/// Bundled as trait objects so tests can substitute recording fakes for the
/// host-backed implementations.
pub struct Facilities {
    pub privilege: Box<dyn PrivilegeCheck>,
    pub kexec: Box<dyn KexecBackend>,
    pub runtime: Box<dyn ContainerRuntime>,
    pub services: Box<dyn ServiceControl>,
    pub dumper: Box<dyn StateDumper>,
    pub platform: Box<dyn PlatformSource>,
    pub disk: Box<dyn DiskSync>,
}

impl Facilities {
    /// Facilities backed by the host: kexec, docker, systemd, the machine
    /// config, and `sync(2)`.
    pub fn host(opts: &RebootOptions) -> Self {
        Facilities {
            privilege: Box::new(EffectiveUid),
            kexec: Box::new(SysKexec::new()),
            runtime: Box::new(DockerCli::new()),
            services: Box::new(SystemdControl::new()),
            dumper: Box::new(CommandDumper::new(opts.dumper_command.clone())),
            platform: Box::new(MachineConf::new(opts.machine_conf.clone())),
            disk: Box::new(HostSync),
        }
    }
}

/// Drives one fast-reboot run front to back.
pub struct Orchestrator {
    opts: RebootOptions,
    facilities: Facilities,
}

impl Orchestrator {
    pub fn new(opts: RebootOptions, facilities: Facilities) -> Self {
        Orchestrator { opts, facilities }
    }

    /// Orchestrator wired to the host facilities.
    pub fn host(opts: RebootOptions) -> Self {
        let facilities = Facilities::host(&opts);
        Orchestrator::new(opts, facilities)
    }

    /// Run the sequence. Does not return on success: the final phase
    /// replaces the running kernel.
    pub async fn run(&self) -> FastbootResult<Infallible> {
        self.facilities.privilege.ensure()?;

        let profile = match self.facilities.platform.resolve().await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("platform profile unresolved, platform drain disabled: {}", e);
                PlatformProfile::unknown()
            }
        };

        let slot = KexecSlot::new(self.facilities.kexec.as_ref());
        slot.ensure_unloaded().await?;

        let image = boot::resolve(&self.opts)?;
        slot.load(&image).await?;

        // Best effort from here down to the engine stop: losing the snapshot
        // or leaving a daemon behind degrades convergence, nothing more.
        match snapshot::capture(
            &self.opts,
            self.facilities.dumper.as_ref(),
            self.facilities.runtime.as_ref(),
        )
        .await
        {
            Ok(snap) => {
                info!(container = %snap.container, "forwarding state staged for restore")
            }
            Err(e) => {
                warn!("forwarding state capture failed, post-boot convergence will be slower: {}", e)
            }
        }

        let executor = HostExecutor {
            services: self.facilities.services.as_ref(),
            runtime: self.facilities.runtime.as_ref(),
        };

        info!("stopping control-plane daemons");
        let outcomes = shutdown::run_plan(shutdown::CONTROL_PLANE_PLAN, &executor).await;
        let failed = outcomes.iter().filter(|o| !o.ok()).count();
        if failed > 0 {
            warn!(failed, "control-plane teardown finished with failures");
        }

        self.drain_containers().await;
        self.stop_host_services().await;

        info!("stopping container engine");
        self.facilities.runtime.stop_engine().await?;

        let plan = platform::drain_plan(&profile);
        if !plan.is_empty() {
            info!(asic = %profile.asic, "stopping platform services");
            shutdown::run_plan(plan, &executor).await;
        }

        sync::barrier(self.facilities.disk.as_ref(), self.opts.settle()).await;

        info!("handing off to the staged kernel");
        slot.execute().await
    }

    /// Kill every running container not in the keep set. Frees resources
    /// ahead of the engine stop.
    async fn drain_containers(&self) {
        let names = match self.facilities.runtime.list().await {
            Ok(names) => names,
            Err(e) => {
                warn!("container enumeration failed, skipping drain: {}", e);
                return;
            }
        };

        for name in names {
            if self.opts.keep_containers.contains(&name) {
                debug!(container = %name, "keeping container");
                continue;
            }
            if let Err(e) = self.facilities.runtime.kill(&name).await {
                warn!(container = %name, "container kill failed: {}", e);
            }
        }
    }

    /// Stop the remaining host service units before the engine goes down.
    async fn stop_host_services(&self) {
        for unit in &self.opts.host_services {
            if let Err(e) = self.facilities.services.stop_unit(unit).await {
                warn!(unit = %unit, "service stop failed: {}", e);
            }
        }
    }
}
