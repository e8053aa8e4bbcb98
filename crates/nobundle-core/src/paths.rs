//! Path helpers shared by the resolver.
//!
//! Public paths are URL-ish strings (always `/`-separated). File paths are
//! OS-native `PathBuf`s; [`slash`] converts them back to forward slashes at
//! the boundary.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Split a public path into its clean part and its `?query` / `#fragment` suffix.
///
/// The suffix starts at the first `?` or `#` and is returned verbatim.
#[must_use]
pub fn split_suffix(path: &str) -> (&str, &str) {
    match path.find(|c: char| c == '?' || c == '#') {
        Some(idx) => path.split_at(idx),
        None => (path, ""),
    }
}

/// Strip any query string and fragment from a public path.
#[must_use]
pub fn clean_url(path: &str) -> &str {
    split_suffix(path).0
}

/// The `?query` part of a specifier (everything from the first `?`), or `""`.
#[must_use]
pub fn query_of(path: &str) -> &str {
    path.find('?').map_or("", |idx| &path[idx..])
}

/// Escape the characters a request path cannot carry literally.
///
/// `%` would be percent-decoded, and `?` or `#` would start a suffix, when
/// the request is mapped back to a file.
#[must_use]
pub fn encode_request_path(path: &str) -> Cow<'_, str> {
    if !path.contains(['%', '?', '#']) {
        return Cow::Borrowed(path);
    }
    let mut encoded = String::with_capacity(path.len() + 8);
    for c in path.chars() {
        match c {
            '%' => encoded.push_str("%25"),
            '?' => encoded.push_str("%3F"),
            '#' => encoded.push_str("%23"),
            other => encoded.push(other),
        }
    }
    Cow::Owned(encoded)
}

/// Render a file path with forward slashes.
#[must_use]
pub fn slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(windows) {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}

/// Normalize a path by removing `.` and resolving `..` components lexically.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other),
        }
    }
    result
}

/// Join a `/`-separated segment onto `base` and normalize the result.
///
/// A leading `/` in `segment` does not reset the path: `join_segment("/root", "/a/b")`
/// is `/root/a/b`.
#[must_use]
pub fn join_segment(base: &Path, segment: &str) -> PathBuf {
    let mut joined = base.to_path_buf();
    for part in segment.split('/').filter(|p| !p.is_empty()) {
        joined.push(part);
    }
    normalize_path(&joined)
}

/// Path of `path` relative to `base`, as `pathdiff` computes it.
#[must_use]
pub fn relative_path(base: &Path, path: &Path) -> Option<PathBuf> {
    pathdiff::diff_paths(path, base)
}

/// Whether `path` is `dir` itself or lies somewhere beneath it.
#[must_use]
pub fn is_within(path: &Path, dir: &Path) -> bool {
    path.starts_with(dir)
}

/// Lexically normalize a `/`-separated path, keeping a leading `/`.
#[must_use]
pub fn posix_normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Directory part of a `/`-separated path (`/a/b.js` → `/a`).
#[must_use]
pub fn posix_dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(idx) => &trimmed[..idx],
        None => ".",
    }
}

/// Resolve `target` against the directory `from_dir` in request space.
///
/// Always yields an absolute, normalized path without a trailing slash.
#[must_use]
pub fn posix_resolve(from_dir: &str, target: &str) -> String {
    let combined = if target.starts_with('/') {
        target.to_string()
    } else {
        format!("/{from_dir}/{target}")
    };
    posix_normalize(&combined)
}

/// Extension of the last segment of a `/`-separated path, including the dot.
#[must_use]
pub fn posix_extname(path: &str) -> &str {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &base[idx..],
    }
}

/// Components of a flattened module id: `@scope/name/in/pkg/path`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeModuleId<'a> {
    /// `@scope` for scoped packages, empty otherwise.
    pub scope: &'a str,
    /// Package name without scope.
    pub name: &'a str,
    /// Path inside the package, empty for the package root.
    pub in_pkg_path: &'a str,
}

/// Parse a bare module id into scope, name and in-package path.
#[must_use]
pub fn parse_node_module_id(id: &str) -> NodeModuleId<'_> {
    let (scope, rest) = if id.starts_with('@') {
        id.split_once('/').unwrap_or((id, ""))
    } else {
        ("", id)
    };
    let (name, in_pkg_path) = rest.split_once('/').unwrap_or((rest, ""));
    NodeModuleId {
        scope,
        name,
        in_pkg_path,
    }
}

/// Split a deep import (`pkg/sub`, `@scope/pkg/sub`) into package id and subpath.
///
/// Returns `None` for a package-root id.
#[must_use]
pub fn split_deep_import(id: &str) -> Option<(&str, &str)> {
    let parsed = parse_node_module_id(id);
    if parsed.in_pkg_path.is_empty() || parsed.name.is_empty() {
        return None;
    }
    let pkg_len = id.len() - parsed.in_pkg_path.len() - 1;
    Some((&id[..pkg_len], parsed.in_pkg_path))
}
