//! Linux backend: `/proc/self/mountinfo` parsing and `openat2`-based mount
//! point detection.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use moor_common::{MountError, MountResult};
use rustix::fs::{CWD, Mode, OFlags, ResolveFlags, openat2};
use rustix::io::Errno;

use crate::{FilterFn, MountInfo, unix};

const MOUNTINFO: &str = "/proc/self/mountinfo";

pub(crate) fn parse_mount_table(filter: Option<&mut FilterFn<'_>>) -> MountResult<Vec<MountInfo>> {
    let file = File::open(MOUNTINFO).map_err(|cause| MountError::Table { cause })?;
    parse_reader(BufReader::new(file), filter)
}

/// Parses mountinfo lines from `reader`, applying `filter` per entry.
pub(crate) fn parse_reader(
    reader: impl BufRead,
    mut filter: Option<&mut FilterFn<'_>>,
) -> MountResult<Vec<MountInfo>> {
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|cause| MountError::Table { cause })?;
        if line.is_empty() {
            continue;
        }
        let info = parse_line(&line)?;
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

/// Parses one `/proc/<pid>/mountinfo` line, e.g.:
///
/// `36 35 98:0 /mnt1 /mnt2 rw,noatime master:1 - ext4 /dev/root rw,errors=continue`
///
/// The fields before the `-` separator are mount ID, parent ID,
/// major:minor, root, mount point, per-mount options, and zero or more
/// optional tags; after it come the filesystem type, source, and
/// superblock options.
fn parse_line(line: &str) -> MountResult<MountInfo> {
    let parse_err = || MountError::Parse {
        line: line.to_string(),
    };

    // Spaces inside paths are octal-escaped, so the separator field cannot
    // be confused with field content.
    let (head, tail) = line.split_once(" - ").ok_or_else(parse_err)?;
    let mut fields = head.split_whitespace();

    let id = fields
        .next()
        .and_then(|f| f.parse().ok())
        .ok_or_else(parse_err)?;
    let parent = fields
        .next()
        .and_then(|f| f.parse().ok())
        .ok_or_else(parse_err)?;
    let (major, minor) = fields
        .next()
        .and_then(|f| f.split_once(':'))
        .and_then(|(maj, min)| Some((maj.parse().ok()?, min.parse().ok()?)))
        .ok_or_else(parse_err)?;
    let root = unescape(fields.next().ok_or_else(parse_err)?);
    let mount_point = PathBuf::from(unescape(fields.next().ok_or_else(parse_err)?));
    let options = fields.next().ok_or_else(parse_err)?.to_string();
    let optional = fields.collect::<Vec<_>>().join(" ");

    let mut fields = tail.split_whitespace();
    let fs_type = unescape(fields.next().ok_or_else(parse_err)?);
    let source = unescape(fields.next().ok_or_else(parse_err)?);
    let vfs_options = fields.next().ok_or_else(parse_err)?.to_string();

    Ok(MountInfo {
        id,
        parent,
        major,
        minor,
        root,
        mount_point,
        options,
        optional,
        fs_type,
        source,
        vfs_options,
    })
}

/// Decodes the octal escapes the kernel uses for whitespace and backslash
/// in mountinfo fields (`\040` for space, `\011` tab, `\012` newline,
/// `\134` backslash). Malformed escapes are kept literally.
fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits.iter().fold(0u32, |v, d| v * 8 + u32::from(d - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Mount detection that works for all mount kinds, including bind mounts,
/// but requires Linux 5.6+ for `openat2(2)`.
///
/// Opens the parent directory, then the final component with
/// `RESOLVE_NO_XDEV`: `EXDEV` proves a mount point, a clean open proves
/// the opposite, and anything else is inconclusive.
fn mounted_by_openat2(path: &Path) -> Result<bool, Errno> {
    let dir = path.parent().unwrap_or_else(|| Path::new("/"));
    let last = path.file_name().ok_or(Errno::INVAL)?;

    let dirfd = openat2(
        CWD,
        dir,
        OFlags::PATH | OFlags::CLOEXEC,
        Mode::empty(),
        ResolveFlags::empty(),
    )?;
    match openat2(
        &dirfd,
        last,
        OFlags::PATH | OFlags::CLOEXEC | OFlags::NOFOLLOW,
        Mode::empty(),
        ResolveFlags::NO_XDEV,
    ) {
        Ok(_fd) => Ok(false),
        Err(Errno::XDEV) => Ok(true),
        Err(errno) => Err(errno),
    }
}

pub(crate) fn mounted(path: &Path) -> MountResult<bool> {
    let path = unix::normalize_path(path)?;

    match mounted_by_openat2(&path) {
        Ok(mounted) => return Ok(mounted),
        Err(errno) => {
            tracing::trace!(path = %path.display(), %errno, "openat2 inconclusive");
        }
    }

    // st_dev comparison misses bind mounts, so only a positive is trusted.
    if matches!(unix::mounted_by_stat(&path), Ok(true)) {
        return Ok(true);
    }

    unix::mounted_by_mountinfo(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::single_entry_filter;
    use std::io::Cursor;

    const SAMPLE: &str = "\
21 26 0:19 / /sys rw,nosuid,nodev,noexec,relatime shared:2 - sysfs sysfs rw
26 1 8:2 / / rw,relatime shared:1 - ext4 /dev/sda2 rw,errors=remount-ro
27 26 0:21 / /proc rw,nosuid,nodev,noexec,relatime shared:14 - proc proc rw
624 26 8:16 / /mnt/with\\040space rw,noatime - xfs /dev/sdb rw,attr2
625 26 0:40 / /tmp/target rw master:2 propagate_from:1 - tmpfs tmpfs rw,size=10240k
";

    fn parse_all(input: &str) -> Vec<MountInfo> {
        parse_reader(Cursor::new(input), None).unwrap()
    }

    #[test]
    fn parses_every_field() {
        let mounts = parse_all(SAMPLE);
        assert_eq!(mounts.len(), 5);

        let root = &mounts[1];
        assert_eq!(root.id, 26);
        assert_eq!(root.parent, 1);
        assert_eq!(root.major, 8);
        assert_eq!(root.minor, 2);
        assert_eq!(root.root, "/");
        assert_eq!(root.mount_point, PathBuf::from("/"));
        assert_eq!(root.options, "rw,relatime");
        assert_eq!(root.optional, "shared:1");
        assert_eq!(root.fs_type, "ext4");
        assert_eq!(root.source, "/dev/sda2");
        assert_eq!(root.vfs_options, "rw,errors=remount-ro");
    }

    #[test]
    fn decodes_escaped_mount_points() {
        let mounts = parse_all(SAMPLE);
        assert_eq!(mounts[3].mount_point, PathBuf::from("/mnt/with space"));
        // No optional fields on this line.
        assert_eq!(mounts[3].optional, "");
    }

    #[test]
    fn keeps_multiple_optional_fields() {
        let mounts = parse_all(SAMPLE);
        assert_eq!(mounts[4].optional, "master:2 propagate_from:1");
        assert_eq!(mounts[4].vfs_options, "rw,size=10240k");
    }

    #[test]
    fn unescape_handles_all_kernel_escapes() {
        assert_eq!(unescape("/plain"), "/plain");
        assert_eq!(unescape("/a\\040b"), "/a b");
        assert_eq!(unescape("/a\\011b"), "/a\tb");
        assert_eq!(unescape("/a\\134b"), "/a\\b");
        // Truncated escape stays literal.
        assert_eq!(unescape("/a\\04"), "/a\\04");
    }

    #[test]
    fn malformed_line_is_fatal() {
        let err = parse_reader(Cursor::new("36 35 98:0 /mnt1\n"), None).unwrap_err();
        assert!(matches!(err, MountError::Parse { .. }));

        let err = parse_reader(Cursor::new("x y 98:0 / / rw - ext4 /dev/sda rw\n"), None)
            .unwrap_err();
        assert!(matches!(err, MountError::Parse { .. }));
    }

    #[test]
    fn single_entry_filter_stops_the_scan() {
        let mut seen = 0usize;
        let mut inner = single_entry_filter("/proc");
        let mut counting = |m: &MountInfo| {
            seen += 1;
            inner(m)
        };
        let mounts = parse_reader(Cursor::new(SAMPLE), Some(&mut counting)).unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].mount_point, PathBuf::from("/proc"));
        // /proc is the third of five entries; the last two were never
        // evaluated.
        assert_eq!(seen, 3);
    }

    #[test]
    fn filter_skips_without_stopping() {
        let mut only_tmpfs = crate::fs_type_filter(["tmpfs"]);
        let mounts = parse_reader(Cursor::new(SAMPLE), Some(&mut only_tmpfs)).unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].mount_point, PathBuf::from("/tmp/target"));
    }
}
