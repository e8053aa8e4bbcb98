//! Fuzzy path disambiguation.
//!
//! A request like `/src/utils` names no file; probing finds `/src/utils.ts`
//! or `/src/utils/index.ts`. Within each extension, the bare suffix is probed
//! before the `/index` suffix, and extensions are tried in priority order.

use nobundle_util::fs::is_file;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Extensions probed for fuzzy requests, in priority order.
pub const SUPPORTED_EXTS: &[&str] = &[".mjs", ".js", ".ts", ".jsx", ".tsx", ".json"];

/// What fuzzy resolution appends to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Postfix {
    /// A bare extension, e.g. `.ts`.
    Extension(&'static str),
    /// An index file inside the directory, e.g. `/index.ts`.
    Index(&'static str),
}

impl Postfix {
    /// The postfix as it is appended to a `/`-separated path.
    #[must_use]
    pub fn as_string(self) -> String {
        match self {
            Self::Extension(ext) => ext.to_string(),
            Self::Index(ext) => format!("/index{ext}"),
        }
    }

    /// Append the postfix to a file path.
    #[must_use]
    pub fn apply(self, path: &Path) -> PathBuf {
        match self {
            Self::Extension(ext) => {
                let mut raw = OsString::from(path.as_os_str());
                raw.push(ext);
                PathBuf::from(raw)
            }
            Self::Index(ext) => path.join(format!("index{ext}")),
        }
    }
}

/// Find the postfix that turns `path` into an existing file.
///
/// Returns `None` when `path` already is a file or when no probe matches.
/// Touches the file system.
#[must_use]
pub fn resolve_postfix(path: &Path) -> Option<Postfix> {
    if is_file(path) {
        return None;
    }
    for &ext in SUPPORTED_EXTS {
        let candidate = Postfix::Extension(ext);
        if is_file(&candidate.apply(path)) {
            return Some(candidate);
        }
        let candidate = Postfix::Index(ext);
        if is_file(&candidate.apply(path)) {
            return Some(candidate);
        }
    }
    None
}

/// Apply fuzzy resolution to `path`, leaving it unchanged if nothing matches.
///
/// The result is not guaranteed to exist. Touches the file system.
#[must_use]
pub fn resolve_fuzzy(path: PathBuf) -> PathBuf {
    match resolve_postfix(&path) {
        Some(postfix) => {
            trace!(path = %path.display(), postfix = %postfix.as_string(), "fuzzy postfix");
            postfix.apply(&path)
        }
        None => path,
    }
}
