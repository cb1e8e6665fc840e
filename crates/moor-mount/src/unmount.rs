//! Lazy unmount and best-effort recursive unmount.

use std::io;
use std::path::Path;

use moor_common::{MountError, MountResult};
use moor_mountinfo::{MountInfo, get_mounts, prefix_filter};

/// Flags recorded in unmount errors, for context.
#[cfg(target_os = "linux")]
const DETACH_FLAGS: u64 = libc::MNT_DETACH as u64;
#[cfg(not(target_os = "linux"))]
const DETACH_FLAGS: u64 = 0;

/// Raw detach unmount; does not mask any error.
#[cfg(target_os = "linux")]
fn detach_unmount(target: &Path) -> io::Result<()> {
    use rustix::mount::{UnmountFlags, unmount};
    unmount(target, UnmountFlags::DETACH).map_err(Into::into)
}

#[cfg(any(target_os = "freebsd", target_os = "openbsd", target_os = "macos"))]
#[allow(unsafe_code)]
fn detach_unmount(target: &Path) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let target = CString::new(target.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    // No lazy-detach flag here; a plain unmount is the closest equivalent.
    // Safety: target is a NUL-terminated buffer that outlives the call.
    let rc = unsafe { libc::unmount(target.as_ptr(), 0) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "macos"
)))]
fn detach_unmount(_target: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "unmount is not implemented on this platform",
    ))
}

/// Lazily unmounts `target` where the platform supports it, otherwise
/// performs a normal unmount. If `target` is not a mount point, no error
/// is returned: unmount is idempotent.
///
/// # Errors
///
/// Returns [`MountError::Syscall`] with op `"umount"` for any other OS
/// failure.
pub fn unmount(target: impl AsRef<Path>) -> MountResult<()> {
    let target = target.as_ref();
    match detach_unmount(target) {
        Ok(()) => Ok(()),
        // EINVAL means target is not a mount point. The same errno would
        // also signal invalid flags, but the flags here are fixed.
        Err(cause) if cause.raw_os_error() == Some(libc::EINVAL) => Ok(()),
        Err(cause) if cause.kind() == io::ErrorKind::Unsupported => {
            Err(MountError::Unsupported { op: "umount" })
        }
        Err(cause) => Err(MountError::Syscall {
            op: "umount",
            device: String::new(),
            target: target.to_path_buf(),
            flags: DETACH_FLAGS,
            data: String::new(),
            cause,
        }),
    }
}

/// Unmounts `target` and every mount underneath it, deepest first.
///
/// `target` does not have to be a mount point itself; it may merely
/// contain mounts. On error, callers must assume some submounts may
/// remain.
///
/// # Errors
///
/// Intermediate failures are tolerated, since overlapping mounts can block
/// each other until a later unmount in the sequence releases them. Only a
/// failure on the last (shallowest) entry is returned, annotated with the
/// first recorded failure as its probable cause.
pub fn recursive_unmount(target: impl AsRef<Path>) -> MountResult<()> {
    let target = target.as_ref();

    // Fast path: on Linux a lazy detach takes the submounts with it; on
    // other platforms submounts make this fail with EBUSY. EINVAL is not
    // masked here, since target may not be a mount point itself while
    // still holding mounts underneath.
    if detach_unmount(target).is_ok() {
        return Ok(());
    }

    tracing::debug!(
        target = %target.display(),
        "direct unmount failed, walking the mount table"
    );
    let mut mounts = get_mounts(Some(&mut prefix_filter(target)))?;
    sort_deepest_first(&mut mounts);
    unmount_in_order(&mounts, |mount_point| unmount(mount_point))
}

/// Longer mount point paths first. Every submount's path strictly extends
/// one of its ancestors' paths, so this guarantees children are unmounted
/// before their parents.
fn sort_deepest_first(mounts: &mut [MountInfo]) {
    mounts.sort_by_key(|m| std::cmp::Reverse(m.mount_point.as_os_str().len()));
}

fn unmount_in_order(
    mounts: &[MountInfo],
    mut unmount_one: impl FnMut(&Path) -> MountResult<()>,
) -> MountResult<()> {
    let mut first_failure: Option<MountError> = None;
    let last = mounts.len().checked_sub(1);

    for (i, mount) in mounts.iter().enumerate() {
        if let Err(err) = unmount_one(&mount.mount_point) {
            if Some(i) == last {
                return Err(match first_failure {
                    Some(cause) => err.with_probable_cause(cause),
                    None => err,
                });
            }
            // A submount failure may be transient; the final unmount
            // fails if it was a real problem. The first failure is the
            // most likely root cause, so keep that one.
            if first_failure.is_none() {
                first_failure = Some(err);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(mount_point: &str) -> MountInfo {
        MountInfo {
            mount_point: mount_point.into(),
            ..MountInfo::default()
        }
    }

    fn busy(target: &Path) -> MountError {
        MountError::Syscall {
            op: "umount",
            device: String::new(),
            target: target.to_path_buf(),
            flags: 0,
            data: String::new(),
            cause: io::Error::from_raw_os_error(libc::EBUSY),
        }
    }

    #[test]
    fn deepest_mounts_sort_first() {
        let mut mounts = vec![entry("/a"), entry("/a/b/c"), entry("/a/b")];
        sort_deepest_first(&mut mounts);
        let order: Vec<PathBuf> = mounts.into_iter().map(|m| m.mount_point).collect();
        assert_eq!(
            order,
            vec![
                PathBuf::from("/a/b/c"),
                PathBuf::from("/a/b"),
                PathBuf::from("/a")
            ]
        );
    }

    #[test]
    fn unmounts_children_before_parents() {
        let mut mounts = vec![entry("/a/b"), entry("/a"), entry("/a/b/c")];
        sort_deepest_first(&mut mounts);

        let mut seen = Vec::new();
        unmount_in_order(&mounts, |mp| {
            seen.push(mp.to_path_buf());
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                PathBuf::from("/a/b/c"),
                PathBuf::from("/a/b"),
                PathBuf::from("/a")
            ]
        );
    }

    #[test]
    fn intermediate_failure_is_not_fatal() {
        let mounts = vec![entry("/a/b/c"), entry("/a/b"), entry("/a")];
        let result = unmount_in_order(&mounts, |mp| {
            if mp == Path::new("/a/b") {
                Err(busy(mp))
            } else {
                Ok(())
            }
        });
        assert!(result.is_ok());
    }

    #[test]
    fn final_failure_carries_the_first_as_probable_cause() {
        let mounts = vec![entry("/a/b/c"), entry("/a/b"), entry("/a")];
        let err = unmount_in_order(&mounts, |mp| {
            if mp == Path::new("/a/b/c") || mp == Path::new("/a") {
                Err(busy(mp))
            } else {
                Ok(())
            }
        })
        .unwrap_err();

        assert!(matches!(err, MountError::ProbableCause { .. }));
        let msg = err.to_string();
        assert!(msg.contains("umount /a"), "{msg}");
        assert!(msg.contains("possible cause: umount /a/b/c"), "{msg}");
    }

    #[test]
    fn final_failure_without_earlier_ones_is_returned_as_is() {
        let mounts = vec![entry("/a/b"), entry("/a")];
        let err = unmount_in_order(&mounts, |mp| {
            if mp == Path::new("/a") {
                Err(busy(mp))
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        assert!(matches!(err, MountError::Syscall { op: "umount", .. }));
    }

    #[test]
    fn empty_mount_list_is_success() {
        unmount_in_order(&[], |_| panic!("must not be called")).unwrap();
    }
}
