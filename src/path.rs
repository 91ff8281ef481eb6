// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

//! Template paths are always reported with `/` separators, regardless of
//! the host platform.

use std::path::{Component, Path};

/// Joins the components of `path` with `/`.
pub fn posix_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push('/'),
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::CurDir => continue,
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}

/// The path of `file` relative to `dir`, or `None` if `file` is not
/// inside `dir`.
pub fn template_path(dir: &Path, file: &Path) -> Option<String> {
    file.strip_prefix(dir).ok().map(posix_path)
}

/// The directory part of a `/` separated path; empty for a bare name.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[..index],
        None => "",
    }
}

/// The last component of a `/` separated path.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Resolves `.` and `..` in a `/` separated path without touching the
/// file system. Leading `..` components that cannot be resolved are kept.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(part),
            },
            _ => parts.push(part),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_posix_path() {
        let path: PathBuf = ["src", "template", "mod.rs"].iter().collect();
        assert_eq!("src/template/mod.rs", posix_path(&path));
        assert_eq!("a/b", posix_path(Path::new("./a/b")));
        assert_eq!("", posix_path(Path::new("")));
    }

    #[test]
    fn test_template_path() {
        let dir = Path::new("/tmp/template");
        assert_eq!(
            Some("src/main.rs".to_string()),
            template_path(dir, &dir.join("src").join("main.rs"))
        );
        assert_eq!(None, template_path(dir, Path::new("/tmp/other/main.rs")));
    }

    #[test]
    fn test_parent_and_basename() {
        assert_eq!("a/b", parent("a/b/c.txt"));
        assert_eq!("", parent("c.txt"));
        assert_eq!("c.txt", basename("a/b/c.txt"));
        assert_eq!("c.txt", basename("c.txt"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!("out/bin/run", normalize("out/scripts/../bin/run"));
        assert_eq!("out/run.sh", normalize("out/./run.sh"));
        assert_eq!("a/b", normalize("a//b/"));
        assert_eq!("../lib", normalize("a/../../lib"));
        assert_eq!("/etc/hosts", normalize("/../etc/hosts"));
        assert_eq!("", normalize("a/.."));
    }
}
