//! # moor-mountinfo
//!
//! Structured access to the mount table of the running system, plus an
//! efficient "is this path a mount point" predicate.
//!
//! On Linux the table is read from `/proc/self/mountinfo`, the canonical
//! hierarchical source. On FreeBSD, OpenBSD, and macOS it is retrieved with
//! `getmntinfo(3)`, which only exposes mount point, filesystem type, and
//! source. Other platforms return [`MountError::Unsupported`].
//!
//! Every call re-reads the table; nothing is cached, since the table is
//! global mutable state that can change under us at any time. Entries must
//! not be cached across mount or unmount operations either, as mount IDs are
//! only unique while the mount exists.
//!
//! ## Usage
//!
//! ```no_run
//! use moor_mountinfo::{get_mounts, mounted, prefix_filter};
//!
//! # fn example() -> moor_common::MountResult<()> {
//! // Everything mounted at or below /mnt
//! let mounts = get_mounts(Some(&mut prefix_filter("/mnt")))?;
//! for m in &mounts {
//!     println!("{} ({})", m.mount_point.display(), m.fs_type);
//! }
//!
//! // Is /mnt/data a mount point?
//! if mounted("/mnt/data")? {
//!     println!("mounted");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use moor_common::MountResult;

mod filter;

pub use filter::{fs_type_filter, parents_filter, prefix_filter, single_entry_filter};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
use linux as imp;

#[cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "macos"))]
mod bsd;
#[cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "macos"))]
use bsd as imp;

#[cfg(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "macos"
))]
mod unix;

#[cfg(not(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "macos"
)))]
mod unsupported;
#[cfg(not(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "macos"
)))]
use unsupported as imp;

/// One row of the live mount table.
///
/// On Linux this is populated from `/proc/self/mountinfo`; on BSD-family
/// systems only [`mount_point`](Self::mount_point),
/// [`fs_type`](Self::fs_type), and [`source`](Self::source) are filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountInfo {
    /// Unique identifier of the mount. May be reused after an unmount.
    pub id: u64,

    /// Identifier of the parent mount, or of self for the root of this
    /// mount namespace's mount tree.
    pub parent: u64,

    /// Major number of the `st_dev` of files on this filesystem.
    pub major: u32,

    /// Minor number of the `st_dev` of files on this filesystem.
    pub minor: u32,

    /// Path of the directory in the filesystem which forms the root of
    /// this mount.
    pub root: String,

    /// Path of the mount point relative to the process's root directory.
    pub mount_point: PathBuf,

    /// Comma-separated per-mount options.
    pub options: String,

    /// Zero or more optional propagation fields of the form `tag[:value]`,
    /// separated by spaces: `shared`, `master`, `propagate_from`,
    /// `unbindable`. See `mount_namespaces(7)`.
    pub optional: String,

    /// Filesystem type in the form `type[.subtype]`.
    pub fs_type: String,

    /// Filesystem-specific source information, or "none".
    pub source: String,

    /// Comma-separated superblock options.
    pub vfs_options: String,
}

/// Filter callback for [`get_mounts`], used to drop entries the caller is
/// not interested in and/or to stop the scan early.
///
/// The callback receives each entry, fully populated with all fields
/// available on the current platform, and returns `(skip, stop)`:
///
/// - `skip`: exclude this entry from the result;
/// - `stop`: do not process any further entries.
pub type FilterFn<'a> = dyn FnMut(&MountInfo) -> (bool, bool) + 'a;

/// Retrieves the list of mounts of the current process, with an optional
/// filter applied (use `None` for no filter).
///
/// The result is a point-in-time snapshot; the table can change before the
/// caller acts on it.
///
/// # Errors
///
/// Returns an error if the mount table cannot be read or parsed. Parse
/// failures are fatal; no partial result is returned.
pub fn get_mounts(filter: Option<&mut FilterFn<'_>>) -> MountResult<Vec<MountInfo>> {
    imp::parse_mount_table(filter)
}

/// Determines whether `path` is a mount point.
///
/// The root path is always reported mounted. Any other path is resolved to
/// an absolute, symlink-free, existing path first; resolution failure is
/// surfaced as an error, never silently treated as "not mounted". Callers
/// not interested in the non-existent-path case can test for it with
/// [`MountError::is_not_exist`](moor_common::MountError::is_not_exist).
///
/// Platform fast paths are tried first (`openat2(2)` with
/// `RESOLVE_NO_XDEV` on Linux, then a device-number comparison against the
/// parent directory); the mount table is only scanned when neither is
/// conclusive, which makes this correct for bind mounts as well.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or the mount table
/// cannot be read.
pub fn mounted(path: impl AsRef<Path>) -> MountResult<bool> {
    let path = path.as_ref();
    // Root is always mounted.
    if path == Path::new("/") {
        return Ok(true);
    }
    imp::mounted(path)
}
