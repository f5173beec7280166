//! Resolves the boot image for the next kernel.

use tracing::debug;

use crate::errors::{FastbootError, FastbootResult};
use crate::options::RebootOptions;

use super::BootImage;

/// Build the [`BootImage`] to stage: the running command line with the
/// fast-path marker inserted, and the kernel/initrd at their configured
/// locations.
///
/// The images are expected at fixed well-known paths; the host platform is
/// responsible for placing them there. Anything else is a config error.
pub fn resolve(opts: &RebootOptions) -> FastbootResult<BootImage> {
    let cmdline = std::fs::read_to_string(&opts.cmdline_source).map_err(|e| {
        FastbootError::Config(format!(
            "read command line {}: {}",
            opts.cmdline_source.display(),
            e
        ))
    })?;

    for (path, what) in [(&opts.kernel_image, "kernel"), (&opts.initrd_image, "initrd")] {
        if !path.is_file() {
            return Err(FastbootError::Config(format!(
                "{} image not found at {}",
                what,
                path.display()
            )));
        }
    }

    let append: Vec<String> = cmdline.split_whitespace().map(str::to_owned).collect();
    let mut image = BootImage::new(
        opts.kernel_image.clone(),
        opts.initrd_image.clone(),
        append,
    );
    image.ensure_marker(&opts.marker_token);

    debug!(
        kernel = %image.kernel.display(),
        initrd = %image.initrd.display(),
        append = %image.append_line(),
        "resolved boot image"
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(cmdline: &str) -> (TempDir, RebootOptions) {
        let dir = TempDir::new().unwrap();
        let kernel = dir.path().join("vmlinuz");
        let initrd = dir.path().join("initrd.img");
        let source = dir.path().join("cmdline");
        fs::write(&kernel, b"kernel").unwrap();
        fs::write(&initrd, b"initrd").unwrap();
        fs::write(&source, cmdline).unwrap();

        let opts = RebootOptions {
            kernel_image: kernel,
            initrd_image: initrd,
            cmdline_source: source,
            ..RebootOptions::default()
        };
        (dir, opts)
    }

    #[test]
    fn test_resolve_inserts_marker() {
        let (_dir, opts) = fixture("root=/dev/sda1 console=ttyS0\n");
        let image = resolve(&opts).unwrap();
        assert_eq!(
            image.append_line(),
            "root=/dev/sda1 console=ttyS0 fast-reboot"
        );
    }

    #[test]
    fn test_resolve_twice_is_idempotent() {
        let (_dir, opts) = fixture("root=/dev/sda1 fast-reboot quiet\n");
        // A command line already carrying the marker resolves unchanged,
        // however many times it runs.
        for _ in 0..2 {
            let image = resolve(&opts).unwrap();
            let count = image.append.iter().filter(|t| *t == "fast-reboot").count();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn test_missing_kernel_is_config_error() {
        let (dir, opts) = fixture("root=/dev/sda1\n");
        fs::remove_file(dir.path().join("vmlinuz")).unwrap();

        match resolve(&opts) {
            Err(FastbootError::Config(msg)) => assert!(msg.contains("kernel")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_initrd_is_config_error() {
        let (dir, opts) = fixture("root=/dev/sda1\n");
        fs::remove_file(dir.path().join("initrd.img")).unwrap();

        assert!(matches!(resolve(&opts), Err(FastbootError::Config(_))));
    }

    #[test]
    fn test_unreadable_cmdline_is_config_error() {
        let (_dir, mut opts) = fixture("root=/dev/sda1\n");
        opts.cmdline_source = "/nonexistent/cmdline".into();

        assert!(matches!(resolve(&opts), Err(FastbootError::Config(_))));
    }

    #[test]
    fn test_empty_cmdline_yields_marker_only() {
        let (_dir, opts) = fixture("");
        let image = resolve(&opts).unwrap();
        assert_eq!(image.append_line(), "fast-reboot");
    }
}
