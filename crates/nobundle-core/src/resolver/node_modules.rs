//! Bare module resolution through `node_modules`.
//!
//! Implements the subset of Node's lookup the dev server needs:
//! - walk `node_modules` directories from a base directory upward;
//! - `pkg` and `pkg/sub` try the file, the file plus an extension, then the
//!   directory (manifest entry fields in priority order, then `index.<ext>`);
//! - the result is canonicalized, following symlinks like the package manager.
//!
//! Failures are never errors here: a missing package is `None` and the
//! serving layer reports the eventual 404.

use super::fuzzy::{resolve_postfix, Postfix, SUPPORTED_EXTS};
use super::memo::Memo;
use super::optimizer::MANIFEST_FILE;
use crate::paths::{join_segment, posix_normalize};
use nobundle_util::fs::{is_dir, is_file, read_to_string_lossy};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Manifest fields naming a package entry, in priority order.
pub const MAIN_FIELDS: &[&str] = &["module", "jsnext", "jsnext:main", "browser", "main"];

/// Resolved package entry information.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeModuleInfo {
    /// Entry id: `<id>/<entry>` when resolved from the manifest, or the raw
    /// manifest entry when the package id is aliased. `None` if the package
    /// declares no usable entry.
    pub entry: Option<String>,
    /// The entry file on disk.
    pub entry_file_path: Option<PathBuf>,
    /// The parsed manifest.
    pub pkg: Value,
}

/// Memoized node-module locator.
#[derive(Debug, Default)]
pub struct NodeModuleLocator {
    /// `(base dir, id)` → file. Only hits are stored.
    files: Memo<(PathBuf, String), PathBuf>,
    /// `(base dir, id)` → package info. Only packages with a readable manifest are stored.
    packages: Memo<(PathBuf, String), NodeModuleInfo>,
}

impl NodeModuleLocator {
    /// Create an empty locator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve bare specifier `id` to a file, starting from `basedir`.
    ///
    /// Touches the file system on a miss.
    pub fn resolve_file(&self, basedir: &Path, id: &str) -> Option<PathBuf> {
        let key = (basedir.to_path_buf(), id.to_string());
        if let Some(hit) = self.files.get(&key) {
            trace!(id, "node module file cache hit");
            return Some(hit);
        }

        match resolve_from(basedir, id) {
            Some(found) => {
                self.files.insert(key, found.clone());
                Some(found)
            }
            None => {
                debug!(id, basedir = %basedir.display(), "failed to resolve node module");
                None
            }
        }
    }

    /// Resolve the entry of package `id`, starting from `basedir`.
    ///
    /// `aliased` is the alias of `id`, if any; when it differs from `id` the
    /// aliased module is used as the entry file. Touches the file system on a miss.
    pub fn resolve_package(
        &self,
        basedir: &Path,
        id: &str,
        aliased: Option<&str>,
    ) -> Option<NodeModuleInfo> {
        let key = (basedir.to_path_buf(), id.to_string());
        if let Some(hit) = self.packages.get(&key) {
            return Some(hit);
        }

        let Some(manifest_path) = resolve_from(basedir, &format!("{id}/{MANIFEST_FILE}")) else {
            debug!(id, "failed to resolve package.json");
            return None;
        };
        let pkg = read_manifest(&manifest_path)?;
        let pkg_dir = manifest_path.parent()?;

        let mut entry = package_entry(&pkg);
        debug!(id, entry = ?entry, "node module entry");

        let mut entry_file_path = aliased
            .filter(|aliased| *aliased != id)
            .and_then(|aliased| self.resolve_file(basedir, aliased));

        if entry_file_path.is_none() {
            if let Some(mut raw) = entry.take() {
                // Some packages omit the extension of their entry.
                let mut entry_file = join_segment(pkg_dir, &raw);
                if let Some(postfix) = resolve_postfix(&entry_file) {
                    entry_file = postfix.apply(&entry_file);
                    raw.push_str(&postfix.as_string());
                }
                entry = Some(posix_normalize(&format!("{id}/{raw}")));
                entry_file_path = Some(entry_file);
            }
        }

        let info = NodeModuleInfo {
            entry,
            entry_file_path,
            pkg,
        };
        self.packages.insert(key, info.clone());
        Some(info)
    }
}

/// The entry a manifest declares: `exports` first, then [`MAIN_FIELDS`].
///
/// An object `browser` field remaps the entry; a `false` mapping removes it.
fn package_entry(pkg: &Value) -> Option<String> {
    let entry = exports_root(pkg).or_else(|| {
        MAIN_FIELDS
            .iter()
            .find_map(|field| pkg.get(*field).and_then(Value::as_str))
    })?;

    match pkg.get("browser") {
        Some(Value::Object(map)) => {
            let normalized = posix_normalize(entry);
            match map.iter().find(|(key, _)| posix_normalize(key) == normalized) {
                Some((_, Value::String(mapped))) => Some(mapped.clone()),
                Some(_) => None,
                None => Some(entry.to_string()),
            }
        }
        _ => Some(entry.to_string()),
    }
}

/// Root entry from `exports`: a string, `exports["."]`, or `exports["."].import`.
fn exports_root(pkg: &Value) -> Option<&str> {
    match pkg.get("exports")? {
        Value::String(target) => Some(target.as_str()),
        Value::Object(map) => match map.get(".")? {
            Value::String(target) => Some(target.as_str()),
            Value::Object(conditions) => conditions.get("import").and_then(Value::as_str),
            _ => None,
        },
        _ => None,
    }
}

fn read_manifest(path: &Path) -> Option<Value> {
    let content = match read_to_string_lossy(path) {
        Ok(content) => content,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "failed to read package.json");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "failed to parse package.json");
            None
        }
    }
}

/// Walk `node_modules` directories upward from `basedir` looking for `id`.
fn resolve_from(basedir: &Path, id: &str) -> Option<PathBuf> {
    basedir.ancestors().find_map(|dir| {
        let node_modules = dir.join("node_modules");
        if !is_dir(&node_modules) {
            return None;
        }
        let candidate = join_segment(&node_modules, id);
        let found = load_file(&candidate).or_else(|| load_directory(&candidate))?;
        Some(dunce::canonicalize(&found).unwrap_or(found))
    })
}

fn load_file(path: &Path) -> Option<PathBuf> {
    if is_file(path) {
        return Some(path.to_path_buf());
    }
    SUPPORTED_EXTS
        .iter()
        .map(|&ext| Postfix::Extension(ext).apply(path))
        .find(|candidate| is_file(candidate))
}

fn load_index(dir: &Path) -> Option<PathBuf> {
    SUPPORTED_EXTS
        .iter()
        .map(|&ext| Postfix::Index(ext).apply(dir))
        .find(|candidate| is_file(candidate))
}

fn load_directory(dir: &Path) -> Option<PathBuf> {
    if !is_dir(dir) {
        return None;
    }
    if let Some(pkg) = read_manifest_if_present(&dir.join(MANIFEST_FILE)) {
        for field in MAIN_FIELDS {
            if let Some(main) = pkg.get(*field).and_then(Value::as_str) {
                let main_path = join_segment(dir, main);
                if let Some(found) = load_file(&main_path).or_else(|| load_index(&main_path)) {
                    return Some(found);
                }
            }
        }
    }
    load_index(dir)
}

fn read_manifest_if_present(path: &Path) -> Option<Value> {
    if is_file(path) {
        read_manifest(path)
    } else {
        None
    }
}
