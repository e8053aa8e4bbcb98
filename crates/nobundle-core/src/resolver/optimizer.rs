//! Pre-bundled dependency cache lookup.
//!
//! The dependency pre-bundler writes flattened copies of frequently imported
//! packages into `<manifest dir>/node_modules/.nobundle/`. This module only
//! locates that directory and the files in it; producing them is the
//! pre-bundler's job.

use super::memo::Memo;
use crate::paths::join_segment;
use nobundle_util::fs::{is_file, lookup_file};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Cache directory, relative to the directory of the nearest `package.json`.
pub const OPTIMIZE_CACHE_DIR: &str = "node_modules/.nobundle";

/// Package manifest file name.
pub const MANIFEST_FILE: &str = "package.json";

/// Memoized optimizer cache locator.
#[derive(Debug, Default)]
pub struct OptimizerCache {
    /// Project root → cache dir, or `None` once a root is known to have no manifest.
    dirs: Memo<PathBuf, Option<PathBuf>>,
    /// `(root, id)` → pre-bundled file. Only hits are stored.
    modules: Memo<(PathBuf, String), PathBuf>,
}

impl OptimizerCache {
    /// Create an empty locator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locate the cache directory for `root`.
    ///
    /// `None` means the project has no manifest, hence no pre-bundled deps.
    /// The directory itself need not exist yet. Touches the file system on a miss.
    pub fn cache_dir(&self, root: &Path) -> Option<PathBuf> {
        self.dirs.get_or_insert_with(root.to_path_buf(), || {
            let manifest = lookup_file(root, &[MANIFEST_FILE])?;
            let manifest_dir = manifest.parent()?;
            Some(join_segment(manifest_dir, OPTIMIZE_CACHE_DIR))
        })
    }

    /// Find the pre-bundled file for module `id`: `<cache>/<id>` or `<cache>/<id>.js`.
    ///
    /// Touches the file system on a miss.
    pub fn resolve_module(&self, root: &Path, id: &str) -> Option<PathBuf> {
        let key = (root.to_path_buf(), id.to_string());
        if let Some(hit) = self.modules.get(&key) {
            trace!(id, "optimized module cache hit");
            return Some(hit);
        }

        let cache_dir = self.cache_dir(root)?;
        let found = [id.to_string(), format!("{id}.js")]
            .into_iter()
            .map(|name| join_segment(&cache_dir, &name))
            .find(|candidate| is_file(candidate))?;

        self.modules.insert(key, found.clone());
        Some(found)
    }
}
