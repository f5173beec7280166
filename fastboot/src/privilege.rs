//! Privilege precondition.
//!
//! Every step of the sequence needs root: kernel staging, service kills,
//! the final transfer. Checked first, before anything with side effects.

use nix::unistd::Uid;

use crate::errors::{FastbootError, FastbootResult};

/// Authority check for privileged host operations.
pub trait PrivilegeCheck: Send + Sync {
    /// Fail if the caller cannot perform privileged operations. No side
    /// effects.
    fn ensure(&self) -> FastbootResult<()>;
}

/// Checks the effective uid of the running process.
pub struct EffectiveUid;

impl PrivilegeCheck for EffectiveUid {
    fn ensure(&self) -> FastbootResult<()> {
        let euid = Uid::effective();
        if euid.is_root() {
            Ok(())
        } else {
            Err(FastbootError::Privilege(format!(
                "effective uid is {}, must be run as root",
                euid
            )))
        }
    }
}
