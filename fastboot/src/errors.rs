//! Error types for the fast-reboot orchestration.
//!
//! Variants map to failure classes, not to modules: the orchestrator decides
//! per call site whether a failure aborts the sequence or is logged and
//! ridden through.

use std::io;
use thiserror::Error;

/// Errors surfaced by orchestration steps and host facilities.
#[derive(Debug, Error)]
pub enum FastbootError {
    /// Caller lacks the authority for privileged host operations.
    #[error("insufficient privileges: {0}")]
    Privilege(String),

    /// The kernel-transfer mechanism rejected a stage, unload, or execute.
    #[error("kexec: {0}")]
    Kexec(String),

    /// Boot image resolution failed (missing image, unreadable command line).
    #[error("boot config: {0}")]
    Config(String),

    /// Forwarding-state snapshot could not be captured or staged.
    #[error("state snapshot: {0}")]
    Snapshot(String),

    /// Container runtime operation failed.
    #[error("container runtime: {0}")]
    Runtime(String),

    /// Service or process control operation failed.
    #[error("service control: {0}")]
    Service(String),

    /// The container runtime engine did not stop cleanly.
    #[error("engine stop: {0}")]
    EngineStop(String),

    /// Platform profile could not be resolved.
    #[error("platform: {0}")]
    Platform(String),

    /// Generic IO error (catch-all).
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

pub type FastbootResult<T> = Result<T, FastbootError>;
