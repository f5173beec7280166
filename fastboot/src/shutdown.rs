//! Ordered shutdown plans.
//!
//! A plan is data: a fixed sequence of [`ShutdownStep`] descriptors. The
//! executor runs every step in order regardless of individual failures and
//! returns the per-step outcomes, so the best-effort policy is observable
//! rather than implicit.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::FastbootResult;
use crate::runtime::ContainerRuntime;
use crate::services::ServiceControl;

/// How a step's target is terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepAction {
    /// SIGKILL every process with this name.
    KillProcess,
    /// Stop a host service unit.
    StopUnit,
    /// Kill a container through the runtime.
    KillContainer,
}

/// One termination step in a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutdownStep {
    pub target: &'static str,
    pub action: StepAction,
}

/// Control-plane teardown, in mandatory order.
///
/// The watchdog dies first: left alive it would restart every daemon killed
/// after it. The routing daemons die before the link-layer services so that
/// no down-link notification reaches peers; neighbors must not notice the
/// restart.
pub const CONTROL_PLANE_PLAN: &[ShutdownStep] = &[
    // Routing-protocol watchdog
    ShutdownStep {
        target: "watchquagga",
        action: StepAction::KillProcess,
    },
    // Routing information base
    ShutdownStep {
        target: "zebra",
        action: StepAction::KillProcess,
    },
    // BGP; peers hold routes via graceful restart while it is down
    ShutdownStep {
        target: "bgpd",
        action: StepAction::KillProcess,
    },
    // Link discovery; would advertise the reboot otherwise
    ShutdownStep {
        target: "lldp",
        action: StepAction::KillContainer,
    },
    // Link aggregation; autorestart would tear down the LAG state
    ShutdownStep {
        target: "teamd",
        action: StepAction::KillContainer,
    },
];

/// Result of executing one step.
#[derive(Debug)]
pub struct StepOutcome {
    pub step: ShutdownStep,
    pub result: FastbootResult<()>,
}

impl StepOutcome {
    pub fn ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Dispatch target for plan execution.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn run_step(&self, step: &ShutdownStep) -> FastbootResult<()>;
}

pub struct HostExecutor<'a> {
    pub services: &'a dyn ServiceControl,
    pub runtime: &'a dyn ContainerRuntime,
}

#[async_trait]
impl StepExecutor for HostExecutor<'_> {
    async fn run_step(&self, step: &ShutdownStep) -> FastbootResult<()> {
        match step.action {
            StepAction::KillProcess => self.services.kill_process(step.target).await,
            StepAction::StopUnit => self.services.stop_unit(step.target).await,
            StepAction::KillContainer => self.runtime.kill(step.target).await,
        }
    }
}

/// Run every step of `plan`, in order.
///
/// Failures are logged and do not stop the plan: a stuck daemon must not
/// block the reboot.
pub async fn run_plan(
    plan: &[ShutdownStep],
    executor: &dyn StepExecutor,
) -> Vec<StepOutcome> {
    let mut outcomes = Vec::with_capacity(plan.len());
    for step in plan {
        let result = executor.run_step(step).await;
        match &result {
            Ok(()) => debug!(target = step.target, "shutdown step done"),
            Err(e) => warn!(target = step.target, "shutdown step failed: {}", e),
        }
        outcomes.push(StepOutcome { step: *step, result });
    }
    outcomes
}
