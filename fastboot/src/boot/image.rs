//! The boot image handed to the kernel-transfer mechanism.

use std::path::PathBuf;

/// Kernel, initrd, and boot arguments for the next boot.
///
/// Scoped to a single orchestration run; built fresh from the running boot
/// configuration and never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootImage {
    pub kernel: PathBuf,
    pub initrd: PathBuf,
    /// Boot argument tokens, in command-line order.
    pub append: Vec<String>,
}

impl BootImage {
    pub fn new(kernel: PathBuf, initrd: PathBuf, append: Vec<String>) -> Self {
        BootImage {
            kernel,
            initrd,
            append,
        }
    }

    /// Append `token` unless it is already present.
    ///
    /// Idempotent: a command line that already carries the marker (a second
    /// run, or a fast boot following a fast boot) is left unchanged.
    pub fn ensure_marker(&mut self, token: &str) {
        if !self.has_marker(token) {
            self.append.push(token.to_string());
        }
    }

    pub fn has_marker(&self, token: &str) -> bool {
        self.append.iter().any(|t| t == token)
    }

    /// The append tokens joined into the single string the transfer
    /// mechanism expects.
    pub fn append_line(&self) -> String {
        self.append.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn image(tokens: &[&str]) -> BootImage {
        BootImage::new(
            PathBuf::from("/boot/vmlinuz"),
            PathBuf::from("/boot/initrd.img"),
            tokens.iter().map(|t| t.to_string()).collect(),
        )
    }

    #[test]
    fn test_marker_appended_once() {
        let mut img = image(&["root=/dev/sda1", "quiet"]);
        img.ensure_marker("fast-reboot");
        img.ensure_marker("fast-reboot");

        let count = img.append.iter().filter(|t| *t == "fast-reboot").count();
        assert_eq!(count, 1);
        assert_eq!(img.append_line(), "root=/dev/sda1 quiet fast-reboot");
    }

    #[test]
    fn test_marker_not_duplicated_when_already_present() {
        let mut img = image(&["root=/dev/sda1", "fast-reboot", "quiet"]);
        img.ensure_marker("fast-reboot");

        let count = img.append.iter().filter(|t| *t == "fast-reboot").count();
        assert_eq!(count, 1);
        // Existing position is preserved
        assert_eq!(img.append[1], "fast-reboot");
    }

    #[test]
    fn test_marker_on_empty_command_line() {
        let mut img = image(&[]);
        img.ensure_marker("fast-reboot");
        assert_eq!(img.append_line(), "fast-reboot");
    }

    #[test]
    fn test_substring_tokens_do_not_count_as_marker() {
        let mut img = image(&["mode=fast-reboot-like"]);
        img.ensure_marker("fast-reboot");
        assert!(img.has_marker("fast-reboot"));
        assert_eq!(img.append.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_marker_exactly_once(tokens in prop::collection::vec("[a-z0-9=._]{1,16}", 0..12)) {
            let mut img = BootImage::new(
                PathBuf::from("/boot/vmlinuz"),
                PathBuf::from("/boot/initrd.img"),
                tokens,
            );
            img.ensure_marker("fast-reboot");
            img.ensure_marker("fast-reboot");

            let count = img.append.iter().filter(|t| *t == "fast-reboot").count();
            prop_assert_eq!(count, 1);
        }
    }
}
