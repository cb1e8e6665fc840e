//! Stub backend for platforms without a supported mount table interface.
//!
//! Returning a distinct error keeps "definitely not mounted" and "cannot
//! tell on this platform" apart for callers.

use std::path::Path;

use moor_common::{MountError, MountResult};

use crate::{FilterFn, MountInfo};

pub(crate) fn parse_mount_table(_filter: Option<&mut FilterFn<'_>>) -> MountResult<Vec<MountInfo>> {
    Err(MountError::Unsupported { op: "get_mounts" })
}

pub(crate) fn mounted(_path: &Path) -> MountResult<bool> {
    Err(MountError::Unsupported { op: "mounted" })
}
