//! # moor-mount
//!
//! Mount, unmount, and recursive unmount primitives.
//!
//! Options are given the way the mount or fstab commands take them, as a
//! comma-separated string mixing flag names and filesystem-specific
//! settings (e.g. `"noatime,ro,bind,size=10k"`). See [`flags`] for the
//! supported names; unknown tokens are handed to the filesystem driver
//! unchanged.
//!
//! All operations are synchronous and issue syscalls directly; there is
//! no locking, caching, or retrying. Concurrent callers race at the OS
//! level exactly as separate mount utilities would, and failure is
//! reported to the caller, who owns the retry policy.
//!
//! ## Usage
//!
//! ```no_run
//! # fn example() -> moor_common::MountResult<()> {
//! // Read-only bind mount
//! moor_mount::mount("/srv/data", "/mnt/data", "none", "bind,ro")?;
//!
//! // Tear down everything below a directory, deepest first
//! moor_mount::recursive_unmount("/mnt")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use std::path::Path;

use moor_common::MountResult;

pub mod flags;
mod options;
mod unmount;

#[cfg(target_os = "linux")]
mod mounter;

pub use flags::MountFlags;
pub use options::parse_options;
pub use unmount::{recursive_unmount, unmount};

/// Mounts a filesystem according to the given configuration.
///
/// `options` is parsed through the platform flag table; the remainder is
/// passed to the OS as filesystem-specific mount data. A remount is
/// assumed when the remount flag is present or `device` is empty or the
/// sentinel `"none"`. Propagation changes and read-only bind enforcement
/// are issued as separate follow-up syscalls, each wrapped with its own
/// operation name on failure.
///
/// # Errors
///
/// Returns [`MountError::Syscall`](moor_common::MountError::Syscall) with
/// op `"mount"`, `"remount"`, or `"remount-ro"` depending on which step
/// failed, and
/// [`MountError::Unsupported`](moor_common::MountError::Unsupported) on
/// non-Linux platforms.
#[cfg(target_os = "linux")]
pub fn mount(
    device: &str,
    target: impl AsRef<Path>,
    fstype: &str,
    options: &str,
) -> MountResult<()> {
    let (flags, data) = parse_options(options);
    mounter::mount(device, target.as_ref(), fstype, flags, &data)
}

/// Mounts a filesystem according to the given configuration.
///
/// # Errors
///
/// Always returns
/// [`MountError::Unsupported`](moor_common::MountError::Unsupported):
/// mounting is only implemented on Linux.
#[cfg(not(target_os = "linux"))]
pub fn mount(
    device: &str,
    target: impl AsRef<Path>,
    fstype: &str,
    options: &str,
) -> MountResult<()> {
    let _ = (device, target, fstype, options);
    Err(moor_common::MountError::Unsupported { op: "mount" })
}
