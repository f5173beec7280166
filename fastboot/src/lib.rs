//! Fast reboot orchestration for network switch control planes.
//!
//! Stages a new kernel through the host's kexec facility and hands control
//! to it without going back through firmware, preserving learned forwarding
//! state (ARP/FDB) and tearing down the control plane in an order that hides
//! the restart from routing and link-layer peers.
//!
//! # Sequence
//!
//! ```text
//! privilege check
//!   → clear prior staged kernel
//!   → resolve boot image (marker token inserted)
//!   → stage kernel
//!   → snapshot ARP/FDB into the restore container   (best effort)
//!   → control-plane teardown, fixed order           (best effort)
//!   → drain containers, stop host services          (best effort)
//!   → stop container engine                         (fatal on failure)
//!   → platform ASIC drain, profile-gated            (best effort)
//!   → sync, settle, sync
//!   → execute staged kernel                         (does not return)
//! ```
//!
//! Every external facility sits behind a trait ([`KexecBackend`],
//! [`ContainerRuntime`], [`ServiceControl`], [`StateDumper`],
//! [`PlatformSource`], [`PrivilegeCheck`], [`DiskSync`]), so the whole
//! sequence is testable against recording fakes.

pub mod boot;
pub mod errors;
pub mod kexec;
pub mod options;
pub mod orchestrator;
pub mod platform;
pub mod privilege;
pub mod runtime;
pub mod services;
pub mod shutdown;
pub mod snapshot;
pub mod sync;

mod util;

pub use boot::BootImage;
pub use errors::{FastbootError, FastbootResult};
pub use kexec::{KexecBackend, KexecSlot, SysKexec};
pub use options::RebootOptions;
pub use orchestrator::{Facilities, Orchestrator};
pub use platform::{MachineConf, PlatformProfile, PlatformSource};
pub use privilege::{EffectiveUid, PrivilegeCheck};
pub use runtime::{ContainerRuntime, DockerCli};
pub use services::{ServiceControl, SystemdControl};
pub use shutdown::{ShutdownStep, StepAction, StepOutcome, CONTROL_PLANE_PLAN};
pub use snapshot::{CommandDumper, StateDumper, StateSnapshot};
pub use sync::{DiskSync, HostSync};
