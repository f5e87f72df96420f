//! Path utilities for kubesupv
//!
//! Manifest `src` and `dest` fields are slash-separated paths that may be
//! written as absolute (`/etc/kubernetes`) even though they always resolve
//! under a root directory.

use std::path::{Component, Path, PathBuf};

/// Characters that are unsafe in a record file name
const PATH_UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Join a manifest path under `root`.
///
/// Leading slashes and `.` components are dropped so `/etc/foo` and `etc/foo`
/// both land at `<root>/etc/foo`. `..` components pop within the joined path
/// but never above `root`.
pub fn join_under(root: &Path, relative: &str) -> PathBuf {
    let mut joined = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::ParentDir => {
                joined.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    root.join(joined)
}

/// Make a package name safe for use as a record file name.
///
/// Replaces unsafe characters with hyphens and collapses runs of hyphens.
/// Returns "unknown" if the result is empty.
pub fn make_path_safe(name: &str) -> String {
    let key: String = name
        .chars()
        .map(|c| if PATH_UNSAFE_CHARS.contains(&c) { '-' } else { c })
        .collect();

    let key = key
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if key.is_empty() || key == "." || key == ".." {
        "unknown".to_string()
    } else {
        key
    }
}

/// Lexically normalize a path: drop `.` components and resolve `..`.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_under_absolute_dest() {
        let root = Path::new("/tmp/root");
        assert_eq!(
            join_under(root, "/etc/kubernetes/admin.conf"),
            PathBuf::from("/tmp/root/etc/kubernetes/admin.conf")
        );
    }

    #[test]
    fn test_join_under_relative_dest() {
        let root = Path::new("/tmp/root");
        assert_eq!(join_under(root, "bin/kubelet"), root.join("bin/kubelet"));
    }

    #[test]
    fn test_join_under_never_escapes_root() {
        let root = Path::new("/tmp/root");
        assert_eq!(join_under(root, "../../etc/passwd"), root.join("etc/passwd"));
        assert_eq!(join_under(root, "/a/../b"), root.join("b"));
    }

    #[test]
    fn test_join_under_root_itself() {
        let root = Path::new("/tmp/root");
        assert_eq!(join_under(root, "/"), root.to_path_buf());
    }

    #[test]
    fn test_make_path_safe() {
        assert_eq!(make_path_safe("containerd"), "containerd");
        assert_eq!(make_path_safe("org/pkg"), "org-pkg");
        assert_eq!(make_path_safe("a//b::c"), "a-b-c");
        assert_eq!(make_path_safe("///"), "unknown");
        assert_eq!(make_path_safe(".."), "unknown");
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean("a/b/../c"), "a/c");
        assert_eq!(clean("/a/./b/"), "/a/b");
        assert_eq!(clean("/../a"), "/a");
        assert_eq!(clean("../a"), "../a");
        assert_eq!(clean(""), ".");
        assert_eq!(clean("a/.."), ".");
    }
}
