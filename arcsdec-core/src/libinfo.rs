// Copyright (c) 2024 The arcsdec Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Library introspection: resolving the on-disk path of a shared library
//! a reader depends on (e.g. `libFLAC`), for diagnostic reporting via
//! [`crate::descriptor::LibInfo`].
//!
//! Rather than walking the process's `link_map` via `dlopen`/`dlinfo`,
//! this parses `/proc/self/maps`, a plain text file the kernel already
//! exposes, avoiding any `unsafe` FFI surface; platforms without it get
//! a no-op fallback.

use crate::descriptor::LibInfo;

/// Resolves a library name (e.g. `"libFLAC"`) to the path of the
/// shared object currently mapped into this process, if any.
pub trait LibraryResolver {
    fn resolve(&self, name: &str) -> Option<String>;

    /// Resolves every name in `names`, pairing each with its resolved
    /// path (or `None` if not found), in input order.
    fn resolve_all(&self, names: &[&str]) -> LibInfo {
        names.iter().map(|&name| (name.to_string(), self.resolve(name))).collect()
    }
}

#[cfg(target_os = "linux")]
pub use linux::ProcMapsResolver as DefaultLibraryResolver;

#[cfg(not(target_os = "linux"))]
pub use fallback::NullLibraryResolver as DefaultLibraryResolver;

#[cfg(target_os = "linux")]
mod linux {
    use super::LibraryResolver;
    use std::fs;

    /// Resolves library names by scanning `/proc/self/maps` for a
    /// mapped path whose basename contains the given name.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct ProcMapsResolver;

    impl LibraryResolver for ProcMapsResolver {
        fn resolve(&self, name: &str) -> Option<String> {
            let maps = fs::read_to_string("/proc/self/maps").ok()?;
            find_mapped_path(&maps, name)
        }
    }

    /// Scans the text of a `/proc/self/maps`-formatted listing for the
    /// first mapped path whose basename contains `name`. Split out from
    /// `resolve` so the parsing logic is testable without a real
    /// `/proc` filesystem.
    pub(super) fn find_mapped_path(maps: &str, name: &str) -> Option<String> {
        for line in maps.lines() {
            let path = match line.split_whitespace().last() {
                Some(field) if field.starts_with('/') => field,
                _ => continue,
            };
            let basename = path.rsplit('/').next().unwrap_or(path);
            if basename.contains(name) {
                return Some(path.to_string());
            }
        }
        None
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        const SAMPLE_MAPS: &str = "\
55a1a2e4d000-55a1a2e4f000 r--p 00000000 08:01 123 /usr/bin/cat
7f2b3e000000-7f2b3e1c1000 r-xp 00000000 08:01 456 /usr/lib/x86_64-linux-gnu/libFLAC.so.12.0.0
7f2b3e400000-7f2b3e420000 r--p 00000000 08:01 789 /usr/lib/x86_64-linux-gnu/libc.so.6
7ffee0000000-7ffee0021000 rw-p 00000000 00:00 0 [stack]
";

        #[test]
        fn finds_mapped_library_by_substring() {
            assert_eq!(
                find_mapped_path(SAMPLE_MAPS, "libFLAC"),
                Some("/usr/lib/x86_64-linux-gnu/libFLAC.so.12.0.0".to_string())
            );
        }

        #[test]
        fn returns_none_for_unmapped_library() {
            assert_eq!(find_mapped_path(SAMPLE_MAPS, "libwavpack"), None);
        }

        #[test]
        fn ignores_anonymous_and_pseudo_mappings() {
            assert_eq!(find_mapped_path(SAMPLE_MAPS, "stack"), None);
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod fallback {
    use super::LibraryResolver;

    /// Reports every library as unresolved. Used on targets where
    /// `/proc/self/maps` does not exist.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct NullLibraryResolver;

    impl LibraryResolver for NullLibraryResolver {
        fn resolve(&self, _name: &str) -> Option<String> {
            None
        }
    }
}
