//! Per-platform mount flag constants.
//!
//! Every symbolic name exists on every platform; names without a native
//! equivalent are zero, a deliberate no-op rather than an error, so that
//! option strings stay portable across platform builds.

/// Native mount flag bitmask. Wide enough for every platform's flag word;
/// narrowed at the syscall boundary.
pub type MountFlags = u64;

#[cfg(target_os = "linux")]
mod imp {
    use super::MountFlags;

    /// Mount the filesystem read-only.
    pub const RDONLY: MountFlags = libc::MS_RDONLY as MountFlags;
    /// Do not honor set-user-identifier or set-group-identifier bits.
    pub const NOSUID: MountFlags = libc::MS_NOSUID as MountFlags;
    /// Disallow access to device special files.
    pub const NODEV: MountFlags = libc::MS_NODEV as MountFlags;
    /// Disallow execution of binaries on the mounted filesystem.
    pub const NOEXEC: MountFlags = libc::MS_NOEXEC as MountFlags;
    /// Write I/O to the filesystem synchronously.
    pub const SYNCHRONOUS: MountFlags = libc::MS_SYNCHRONOUS as MountFlags;
    /// Write directory changes synchronously.
    pub const DIRSYNC: MountFlags = libc::MS_DIRSYNC as MountFlags;
    /// Alter the flags of an already-mounted filesystem.
    pub const REMOUNT: MountFlags = libc::MS_REMOUNT as MountFlags;
    /// Allow mandatory locks on the filesystem.
    pub const MANDLOCK: MountFlags = libc::MS_MANDLOCK as MountFlags;
    /// Do not update access times when reading files.
    pub const NOATIME: MountFlags = libc::MS_NOATIME as MountFlags;
    /// Do not update access times when reading directories.
    pub const NODIRATIME: MountFlags = libc::MS_NODIRATIME as MountFlags;
    /// Make a file or directory visible at a second path.
    pub const BIND: MountFlags = libc::MS_BIND as MountFlags;
    /// Bind including submounts.
    pub const RBIND: MountFlags = (libc::MS_BIND | libc::MS_REC) as MountFlags;
    /// Make the mount unable to be bind-mounted.
    pub const UNBINDABLE: MountFlags = libc::MS_UNBINDABLE as MountFlags;
    /// Recursively [`UNBINDABLE`].
    pub const RUNBINDABLE: MountFlags = (libc::MS_UNBINDABLE | libc::MS_REC) as MountFlags;
    /// Do not propagate mount events to or from this mount.
    pub const PRIVATE: MountFlags = libc::MS_PRIVATE as MountFlags;
    /// Recursively [`PRIVATE`].
    pub const RPRIVATE: MountFlags = (libc::MS_PRIVATE | libc::MS_REC) as MountFlags;
    /// Receive mount events from the peer group without propagating.
    pub const SLAVE: MountFlags = libc::MS_SLAVE as MountFlags;
    /// Recursively [`SLAVE`].
    pub const RSLAVE: MountFlags = (libc::MS_SLAVE | libc::MS_REC) as MountFlags;
    /// Propagate mount events to and from the peer group.
    pub const SHARED: MountFlags = libc::MS_SHARED as MountFlags;
    /// Recursively [`SHARED`].
    pub const RSHARED: MountFlags = (libc::MS_SHARED | libc::MS_REC) as MountFlags;
    /// Update access times relative to modify or change time.
    pub const RELATIME: MountFlags = libc::MS_RELATIME as MountFlags;
    /// Always update the last access time.
    pub const STRICTATIME: MountFlags = libc::MS_STRICTATIME as MountFlags;
}

#[cfg(any(target_os = "freebsd", target_os = "openbsd"))]
mod imp {
    use super::MountFlags;

    /// Mount the filesystem read-only.
    pub const RDONLY: MountFlags = libc::MNT_RDONLY as MountFlags;
    /// Do not honor set-user-identifier or set-group-identifier bits.
    pub const NOSUID: MountFlags = libc::MNT_NOSUID as MountFlags;
    /// Disallow execution of binaries on the mounted filesystem.
    pub const NOEXEC: MountFlags = libc::MNT_NOEXEC as MountFlags;
    /// Write I/O to the filesystem synchronously.
    pub const SYNCHRONOUS: MountFlags = libc::MNT_SYNCHRONOUS as MountFlags;
    /// Do not update access times when reading files.
    pub const NOATIME: MountFlags = libc::MNT_NOATIME as MountFlags;

    // No native equivalent here.

    /// Unsupported on this platform; no-op.
    pub const BIND: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const DIRSYNC: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const MANDLOCK: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const NODEV: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const NODIRATIME: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const UNBINDABLE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RUNBINDABLE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const PRIVATE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RPRIVATE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const SHARED: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RSHARED: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const SLAVE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RSLAVE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RBIND: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RELATIME: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const REMOUNT: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const STRICTATIME: MountFlags = 0;
}

#[cfg(not(any(target_os = "linux", target_os = "freebsd", target_os = "openbsd")))]
mod imp {
    use super::MountFlags;

    /// Unsupported on this platform; no-op.
    pub const RDONLY: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const NOSUID: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const NODEV: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const NOEXEC: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const SYNCHRONOUS: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const DIRSYNC: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const REMOUNT: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const MANDLOCK: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const NOATIME: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const NODIRATIME: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const BIND: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RBIND: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const UNBINDABLE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RUNBINDABLE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const PRIVATE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RPRIVATE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const SLAVE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RSLAVE: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const SHARED: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RSHARED: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const RELATIME: MountFlags = 0;
    /// Unsupported on this platform; no-op.
    pub const STRICTATIME: MountFlags = 0;
}

pub use imp::*;
