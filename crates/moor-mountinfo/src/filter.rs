//! Composable filters for [`get_mounts`](crate::get_mounts).
//!
//! Each filter is a pure predicate over one [`MountInfo`] returning
//! `(skip, stop)`; see [`FilterFn`](crate::FilterFn) for the contract.

use std::path::PathBuf;

use crate::MountInfo;

/// Keeps entries whose mount point is `prefix` or lies beneath it.
///
/// The prefix is treated as a path, not a string prefix: given `/foo`,
/// entries `/foo` and `/foo/bar` are kept while `/foobar` is discarded. The
/// prefix must be absolute, cleaned, and have all symlinks resolved. Never
/// stops early, since a prefix can match any number of entries.
pub fn prefix_filter(prefix: impl Into<PathBuf>) -> impl FnMut(&MountInfo) -> (bool, bool) {
    let prefix = prefix.into();
    move |m: &MountInfo| (!m.mount_point.starts_with(&prefix), false)
}

/// Keeps only the entry whose mount point is exactly `mount_point`, and
/// stops the scan as soon as it is found.
pub fn single_entry_filter(mount_point: impl Into<PathBuf>) -> impl FnMut(&MountInfo) -> (bool, bool) {
    let mount_point = mount_point.into();
    move |m: &MountInfo| {
        if m.mount_point == mount_point {
            (false, true) // don't skip, stop now
        } else {
            (true, false) // skip, keep going
        }
    }
}

/// Keeps entries whose mount point is an ancestor of `path`, or `path`
/// itself.
///
/// For `/var/lib/moor/something`, entries like `/var/lib/moor`, `/var`, and
/// `/` are kept. Never stops early.
pub fn parents_filter(path: impl Into<PathBuf>) -> impl FnMut(&MountInfo) -> (bool, bool) {
    let path = path.into();
    move |m: &MountInfo| (!path.starts_with(&m.mount_point), false)
}

/// Keeps entries whose filesystem type is one of `types`. Never stops
/// early.
pub fn fs_type_filter<I, S>(types: I) -> impl FnMut(&MountInfo) -> (bool, bool)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let types: Vec<String> = types.into_iter().map(Into::into).collect();
    move |m: &MountInfo| (!types.iter().any(|t| *t == m.fs_type), false)
}
