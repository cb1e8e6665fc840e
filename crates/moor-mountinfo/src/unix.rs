//! Helpers shared by the Unix mount table backends.

use std::path::{Path, PathBuf};

use moor_common::{MountError, MountResult};

use crate::{get_mounts, single_entry_filter};

/// Resolves `path` to an absolute, symlink-free, existing path.
///
/// Resolution failure (the path does not exist, a component cannot be read,
/// a symlink loop) is fatal to the caller; `mounted` must never turn it
/// into "not mounted".
pub(crate) fn normalize_path(path: &Path) -> MountResult<PathBuf> {
    std::fs::canonicalize(path).map_err(|cause| MountError::Resolve {
        path: path.to_path_buf(),
        cause,
    })
}

/// Compares the `st_dev` of `path` against its parent directory.
///
/// A mismatch proves a mount point. A match proves nothing: bind mounts
/// share the device number with their source, so callers may only trust a
/// `true` result on Linux.
pub(crate) fn mounted_by_stat(path: &Path) -> MountResult<bool> {
    let st = rustix::fs::lstat(path).map_err(|errno| MountError::Resolve {
        path: path.to_path_buf(),
        cause: errno.into(),
    })?;
    let parent = path.parent().unwrap_or_else(|| Path::new("/"));
    let parent_st = rustix::fs::lstat(parent).map_err(|errno| MountError::Resolve {
        path: parent.to_path_buf(),
        cause: errno.into(),
    })?;
    Ok(st.st_dev != parent_st.st_dev)
}

/// Scans the mount table for an exact mount point match.
///
/// The slowest method, but always correct, including for bind mounts.
pub(crate) fn mounted_by_mountinfo(path: &Path) -> MountResult<bool> {
    let entries = get_mounts(Some(&mut single_entry_filter(path)))?;
    Ok(!entries.is_empty())
}
