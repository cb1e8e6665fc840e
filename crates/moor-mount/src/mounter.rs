//! The Linux mount executor.
//!
//! `mount(2)` is not atomic across "attach", "change propagation", and
//! "enforce read-only on a bind": each is a separate syscall that must be
//! sequenced and error-reported on its own.

#![allow(unsafe_code)]

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use moor_common::{MountError, MountResult};

use crate::flags::MountFlags;

/// The set of propagation type bits.
const PTYPES: MountFlags =
    (libc::MS_SHARED | libc::MS_PRIVATE | libc::MS_SLAVE | libc::MS_UNBINDABLE) as MountFlags;

/// The full set of valid flags for a propagation change call.
const PFLAGS: MountFlags = PTYPES | (libc::MS_REC | libc::MS_SILENT) as MountFlags;

/// The combination of bind and read-only.
const BROFLAGS: MountFlags = (libc::MS_BIND | libc::MS_RDONLY) as MountFlags;

/// True if either the device name or the flags identify a remount request.
///
/// An empty device and the sentinel "none" are treated as remount requests
/// for compatibility with callers that manipulate bind mounts without
/// setting the remount flag explicitly.
fn is_remount(device: &str, flags: MountFlags) -> bool {
    flags & libc::MS_REMOUNT as MountFlags != 0 || device.is_empty() || device == "none"
}

pub(crate) fn mount(
    device: &str,
    target: &Path,
    fstype: &str,
    flags: MountFlags,
    data: &str,
) -> MountResult<()> {
    let oflags = flags & !PTYPES;

    if !is_remount(device, flags) || !data.is_empty() {
        // Initial call applying all non-propagation flags, for a mount or
        // for a remount with changed data.
        tracing::debug!(
            device,
            target = %target.display(),
            fstype,
            flags = oflags,
            data,
            "mounting filesystem"
        );
        do_mount(device, target, fstype, oflags, data).map_err(|cause| MountError::Syscall {
            op: "mount",
            device: device.to_string(),
            target: target.to_path_buf(),
            flags: oflags,
            data: data.to_string(),
            cause,
        })?;
    }

    if flags & PTYPES != 0 {
        // Change the propagation type.
        tracing::debug!(
            target = %target.display(),
            flags = flags & PFLAGS,
            "changing mount propagation"
        );
        do_mount("", target, "", flags & PFLAGS, "").map_err(|cause| MountError::Syscall {
            op: "remount",
            device: String::new(),
            target: target.to_path_buf(),
            flags: flags & PFLAGS,
            data: String::new(),
            cause,
        })?;
    }

    if oflags & BROFLAGS == BROFLAGS {
        // A read-only bind request is silently ignored by the kernel in a
        // single call; remount the bind to apply read-only.
        tracing::debug!(target = %target.display(), "remounting bind read-only");
        do_mount(
            "",
            target,
            "",
            oflags | libc::MS_REMOUNT as MountFlags,
            "",
        )
        .map_err(|cause| MountError::Syscall {
            op: "remount-ro",
            device: String::new(),
            target: target.to_path_buf(),
            flags: oflags | libc::MS_REMOUNT as MountFlags,
            data: String::new(),
            cause,
        })?;
    }

    Ok(())
}

fn do_mount(
    device: &str,
    target: &Path,
    fstype: &str,
    flags: MountFlags,
    data: &str,
) -> io::Result<()> {
    let device = cstring(device.as_bytes())?;
    let target = cstring(target.as_os_str().as_bytes())?;
    let fstype = cstring(fstype.as_bytes())?;
    let data_c = cstring(data.as_bytes())?;
    let data_ptr = if data.is_empty() {
        std::ptr::null()
    } else {
        data_c.as_ptr().cast::<libc::c_void>()
    };

    // Safety: all pointers reference NUL-terminated buffers that outlive
    // the call.
    let rc = unsafe {
        libc::mount(
            device.as_ptr(),
            target.as_ptr(),
            fstype.as_ptr(),
            flags as libc::c_ulong,
            data_ptr,
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

fn cstring(bytes: &[u8]) -> io::Result<CString> {
    CString::new(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remount_detection() {
        let remount = libc::MS_REMOUNT as MountFlags;
        assert!(is_remount("/dev/sda1", remount));
        assert!(is_remount("", 0));
        assert!(is_remount("none", 0));
        assert!(!is_remount("/dev/sda1", 0));
        assert!(!is_remount("tmpfs", 0));
    }

    #[test]
    fn propagation_bits_are_disjoint_from_base_flags() {
        let flags = (libc::MS_BIND | libc::MS_RDONLY | libc::MS_PRIVATE) as MountFlags;
        assert_eq!(flags & !PTYPES, BROFLAGS);
        assert_eq!(flags & PTYPES, libc::MS_PRIVATE as MountFlags);
    }
}
