//! Disk sync barrier.

use std::time::Duration;

use tracing::debug;

/// Filesystem flush facility.
pub trait DiskSync: Send + Sync {
    fn sync(&self);
}

/// Host implementation calling `sync(2)`.
pub struct HostSync;

impl DiskSync for HostSync {
    fn sync(&self) {
        nix::unistd::sync();
    }
}

/// Flush filesystem buffers: sync, settle, sync again.
///
/// The settle interval lets asynchronous write completion land before the
/// second pass; without it, in-flight writeback can race the kernel
/// transfer and corrupt on-disk state.
pub async fn barrier(disk: &dyn DiskSync, settle: Duration) {
    debug!(settle_ms = settle.as_millis() as u64, "flushing filesystem buffers");
    disk.sync();
    tokio::time::sleep(settle).await;
    disk.sync();
}
