//! Boot image resolution.
//!
//! Builds the [`BootImage`] staged into the kernel-transfer slot: the
//! running kernel's command line plus the fast-path marker token, and the
//! kernel/initrd at their well-known locations.

mod image;
mod resolver;

pub use image::BootImage;
pub use resolver::resolve;
