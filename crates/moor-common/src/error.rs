//! Common error types for the Moor mount toolkit.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`MountError`].
pub type MountResult<T> = Result<T, MountError>;

/// Errors across the Moor crates.
#[derive(Error, Diagnostic, Debug)]
pub enum MountError {
    /// A mount, remount, or unmount syscall failed.
    #[error("{}", render_syscall(.op, .device, .target, .flags, .data, .cause))]
    #[diagnostic(code(moor::mount::syscall))]
    Syscall {
        /// The operation that failed: "mount", "umount", "remount", or
        /// "remount-ro".
        op: &'static str,
        /// Mount source (device, directory, or empty for remount-style calls).
        device: String,
        /// Mount target path.
        target: PathBuf,
        /// Flags passed to the syscall.
        flags: u64,
        /// Filesystem-specific data string passed to the syscall.
        data: String,
        /// The underlying OS error.
        #[source]
        cause: io::Error,
    },

    /// A path could not be resolved to an absolute, symlink-free, existing
    /// path.
    #[error("cannot resolve {}: {cause}", .path.display())]
    #[diagnostic(code(moor::mount::resolve))]
    Resolve {
        /// The path as given by the caller.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        cause: io::Error,
    },

    /// The mount table could not be read.
    #[error("failed to read the mount table: {cause}")]
    #[diagnostic(code(moor::mountinfo::table))]
    Table {
        /// The underlying OS error.
        #[source]
        cause: io::Error,
    },

    /// A mount table entry did not match the expected format.
    #[error("malformed mount table entry: {line:?}")]
    #[diagnostic(code(moor::mountinfo::parse))]
    Parse {
        /// The offending line, verbatim.
        line: String,
    },

    /// Operation not implemented on this platform.
    #[error("{op} is not implemented on {}", std::env::consts::OS)]
    #[diagnostic(
        code(moor::unsupported),
        help("mount operations require Linux; mount table reads also work on FreeBSD, OpenBSD, and macOS")
    )]
    Unsupported {
        /// The unsupported operation.
        op: &'static str,
    },

    /// A recursive unmount failed; the final error is annotated with the
    /// first failure seen during the teardown pass, which is the probable
    /// (but not proven) root cause.
    #[error("{error} (possible cause: {cause})")]
    #[diagnostic(code(moor::mount::recursive_unmount))]
    ProbableCause {
        /// The error from the last (shallowest) unmount.
        #[source]
        error: Box<MountError>,
        /// The first failure recorded during the pass.
        cause: Box<MountError>,
    },
}

impl MountError {
    /// The underlying OS error, if this error wraps one.
    ///
    /// For [`MountError::ProbableCause`] this is the OS error behind the
    /// final unmount failure.
    #[must_use]
    pub fn cause(&self) -> Option<&io::Error> {
        match self {
            Self::Syscall { cause, .. }
            | Self::Resolve { cause, .. }
            | Self::Table { cause } => Some(cause),
            Self::ProbableCause { error, .. } => error.cause(),
            Self::Parse { .. } | Self::Unsupported { .. } => None,
        }
    }

    /// True if this error reports a path that does not exist.
    ///
    /// `mounted` surfaces a non-existent path as an error rather than as
    /// "not mounted"; callers that want to treat it as the latter can test
    /// for it here.
    #[must_use]
    pub fn is_not_exist(&self) -> bool {
        matches!(
            self,
            Self::Resolve { cause, .. } if cause.kind() == io::ErrorKind::NotFound
        )
    }

    /// Annotate this error with an earlier failure as its probable cause.
    #[must_use]
    pub fn with_probable_cause(self, cause: MountError) -> Self {
        Self::ProbableCause {
            error: Box::new(self),
            cause: Box::new(cause),
        }
    }
}

fn render_syscall(
    op: &str,
    device: &str,
    target: &Path,
    flags: &u64,
    data: &str,
    cause: &io::Error,
) -> String {
    let mut out = String::from(op);
    out.push(' ');
    if device.is_empty() {
        let _ = write!(out, "{}", target.display());
    } else {
        let _ = write!(out, "{}:{}", device, target.display());
    }
    if *flags != 0 {
        let _ = write!(out, ", flags: {flags:#x}");
    }
    if !data.is_empty() {
        let _ = write!(out, ", data: {data}");
    }
    let _ = write!(out, ": {cause}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy() -> io::Error {
        io::Error::from_raw_os_error(16) // EBUSY
    }

    #[test]
    fn syscall_display_full() {
        let err = MountError::Syscall {
            op: "mount",
            device: "/dev/sda1".into(),
            target: PathBuf::from("/mnt"),
            flags: 0x1,
            data: "size=10k".into(),
            cause: busy(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("mount /dev/sda1:/mnt, flags: 0x1, data: size=10k: "));
    }

    #[test]
    fn syscall_display_omits_empty_parts() {
        let err = MountError::Syscall {
            op: "umount",
            device: String::new(),
            target: PathBuf::from("/mnt"),
            flags: 0,
            data: String::new(),
            cause: busy(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("umount /mnt: "));
        assert!(!msg.contains("flags"));
        assert!(!msg.contains("data"));
    }

    #[test]
    fn syscall_source_is_preserved() {
        let err = MountError::Syscall {
            op: "mount",
            device: "tmpfs".into(),
            target: PathBuf::from("/mnt"),
            flags: 0,
            data: String::new(),
            cause: busy(),
        };
        assert_eq!(err.cause().unwrap().raw_os_error(), Some(16));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), busy().to_string());
    }

    #[test]
    fn probable_cause_display() {
        let last = MountError::Syscall {
            op: "umount",
            device: String::new(),
            target: PathBuf::from("/a"),
            flags: 0,
            data: String::new(),
            cause: busy(),
        };
        let first = MountError::Syscall {
            op: "umount",
            device: String::new(),
            target: PathBuf::from("/a/b"),
            flags: 0,
            data: String::new(),
            cause: busy(),
        };
        let err = last.with_probable_cause(first);
        let msg = err.to_string();
        assert!(msg.contains("umount /a"));
        assert!(msg.contains("(possible cause: umount /a/b"));
        assert!(err.cause().is_some());
    }

    #[test]
    fn not_exist_detection() {
        let err = MountError::Resolve {
            path: PathBuf::from("/no/such/path"),
            cause: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.is_not_exist());

        let err = MountError::Resolve {
            path: PathBuf::from("/root/denied"),
            cause: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_not_exist());
    }
}
