//! BSD-family backend: `getmntinfo(3)`.
//!
//! The BSD mount table is flat and only carries the mount point, the
//! filesystem type, and the source; the remaining [`MountInfo`] fields are
//! left at their defaults.

#![allow(unsafe_code)]

use std::ffi::CStr;
use std::io;
use std::path::{Path, PathBuf};

use moor_common::{MountError, MountResult};

use crate::{FilterFn, MountInfo, unix};

pub(crate) fn parse_mount_table(mut filter: Option<&mut FilterFn<'_>>) -> MountResult<Vec<MountInfo>> {
    let mut raw: *mut libc::statfs = std::ptr::null_mut();
    // MNT_WAIT asks for up-to-date statistics rather than cached ones.
    let count = unsafe { libc::getmntinfo(&mut raw, libc::MNT_WAIT) };
    if count <= 0 {
        return Err(MountError::Table {
            cause: io::Error::last_os_error(),
        });
    }
    // Safety: on success getmntinfo points raw at an array of `count`
    // statfs records owned by libc; it stays valid until the next call.
    let entries = unsafe { std::slice::from_raw_parts(raw, count as usize) };

    let mut out = Vec::new();
    for entry in entries {
        let info = MountInfo {
            mount_point: PathBuf::from(field_str(&entry.f_mntonname)),
            fs_type: field_str(&entry.f_fstypename),
            source: field_str(&entry.f_mntfromname),
            ..MountInfo::default()
        };
        if let Some(filter) = filter.as_mut() {
            let (skip, stop) = filter(&info);
            if !skip {
                out.push(info);
            }
            if stop {
                break;
            }
        } else {
            out.push(info);
        }
    }
    Ok(out)
}

fn field_str(field: &[libc::c_char]) -> String {
    // Safety: statfs name fields are NUL-terminated fixed-size buffers.
    unsafe { CStr::from_ptr(field.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

pub(crate) fn mounted(path: &Path) -> MountResult<bool> {
    let path = unix::normalize_path(path)?;

    // The st_dev comparison is reliable in both directions here: these
    // platforms have no bind mounts.
    match unix::mounted_by_stat(&path) {
        Ok(mounted) => Ok(mounted),
        Err(_) => unix::mounted_by_mountinfo(&path),
    }
}
