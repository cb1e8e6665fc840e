//! Textual mount option parsing.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::flags::{self, MountFlags};

/// Option name to native flag value for the current platform. Zero-valued
/// entries are recognized but contribute nothing, keeping option strings
/// portable across platform builds.
static OPTION_FLAGS: Lazy<HashMap<&'static str, MountFlags>> = Lazy::new(|| {
    HashMap::from([
        ("defaults", 0),
        ("ro", flags::RDONLY),
        ("rw", 0),
        ("suid", 0),
        ("nosuid", flags::NOSUID),
        ("dev", 0),
        ("nodev", flags::NODEV),
        ("exec", 0),
        ("noexec", flags::NOEXEC),
        ("sync", flags::SYNCHRONOUS),
        ("async", 0),
        ("dirsync", flags::DIRSYNC),
        ("remount", flags::REMOUNT),
        ("mand", flags::MANDLOCK),
        ("nomand", 0),
        ("atime", 0),
        ("noatime", flags::NOATIME),
        ("diratime", 0),
        ("nodiratime", flags::NODIRATIME),
        ("bind", flags::BIND),
        ("rbind", flags::RBIND),
        ("unbindable", flags::UNBINDABLE),
        ("runbindable", flags::RUNBINDABLE),
        ("private", flags::PRIVATE),
        ("rprivate", flags::RPRIVATE),
        ("shared", flags::SHARED),
        ("rshared", flags::RSHARED),
        ("slave", flags::SLAVE),
        ("rslave", flags::RSLAVE),
        ("relatime", flags::RELATIME),
        ("norelatime", 0),
        ("strictatime", flags::STRICTATIME),
        ("nostrictatime", 0),
    ])
});

/// Splits a comma-separated option string into a flag bitmask and the
/// residual filesystem-specific data string.
///
/// Tokens found in the platform flag table are ORed into the bitmask and
/// consumed; every other token is passed through, comma-joined in
/// first-seen order, for the filesystem driver to interpret or reject
/// (e.g. `size=10k` for tmpfs). Unknown tokens are never an error at this
/// layer.
#[must_use]
pub fn parse_options(options: &str) -> (MountFlags, String) {
    let mut flags: MountFlags = 0;
    let mut data: Vec<&str> = Vec::new();

    for option in options.split(',').filter(|o| !o.is_empty()) {
        match OPTION_FLAGS.get(option) {
            Some(flag) => flags |= *flag,
            None => data.push(option),
        }
    }

    (flags, data.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{NOATIME, NOEXEC, RDONLY};

    #[test]
    fn splits_flags_from_data() {
        let (flags, data) = parse_options("noatime,ro,noexec,size=10k");
        assert_eq!(flags, NOATIME | RDONLY | NOEXEC);
        assert_eq!(data, "size=10k");
    }

    #[test]
    fn data_keeps_first_seen_order() {
        let (flags, data) = parse_options("size=10k,ro,mode=700,uid=0");
        assert_eq!(flags, RDONLY);
        assert_eq!(data, "size=10k,mode=700,uid=0");
    }

    #[test]
    fn duplicate_flags_are_idempotent() {
        let (flags, data) = parse_options("ro,ro,noexec,ro");
        assert_eq!(flags, RDONLY | NOEXEC);
        assert_eq!(data, "");
    }

    #[test]
    fn no_op_options_are_consumed_not_forwarded() {
        // "rw" and "defaults" have no flag value but are part of the
        // option vocabulary; they must not leak into the data string.
        let (flags, data) = parse_options("defaults,rw,atime");
        assert_eq!(flags, 0);
        assert_eq!(data, "");
    }

    #[test]
    fn empty_and_blank_tokens_are_dropped() {
        let (flags, data) = parse_options("");
        assert_eq!((flags, data.as_str()), (0, ""));

        let (flags, data) = parse_options("ro,,size=1m");
        assert_eq!(flags, RDONLY);
        assert_eq!(data, "size=1m");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn bind_and_propagation_options_map_to_native_bits() {
        use crate::flags::{BIND, RBIND, RPRIVATE, RSHARED};

        let (flags, data) = parse_options("bind");
        assert_eq!(flags, BIND);
        assert_eq!(data, "");

        let (flags, _) = parse_options("rbind,rprivate");
        assert_eq!(flags, RBIND | RPRIVATE);

        let (flags, _) = parse_options("rshared");
        assert_eq!(flags, RSHARED);
    }
}
