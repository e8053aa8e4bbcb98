//! Alias table builder.
//!
//! Splits configured aliases into two kinds:
//! - literal aliases (`react` → `preact/compat`), applied to bare module ids;
//! - directory aliases (`/@components/` → `/abs/src/components`), applied by
//!   prefix in request space. Each one becomes a [`DirAliasResolver`] entry.

use super::entry::Resolver;
use crate::config::AliasMap;
use crate::paths::{encode_request_path, join_segment, slash};
use indexmap::IndexMap;
use nobundle_util::fs::is_dir;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolver entry synthesized from a directory alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirAliasResolver {
    /// Request prefix, starting and ending with `/`.
    key: String,
    /// Absolute directory the prefix maps to.
    target: PathBuf,
}

impl DirAliasResolver {
    /// Create an entry mapping `key` to `target`.
    pub fn new(key: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            target: target.into(),
        }
    }

    /// The request prefix.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The target directory.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl Resolver for DirAliasResolver {
    fn name(&self) -> &str {
        "dir-alias"
    }

    fn request_to_file(&self, public_path: &str, _root: &Path) -> Option<PathBuf> {
        let rest = public_path.strip_prefix(self.key.as_str())?;
        Some(join_segment(&self.target, rest))
    }

    fn file_to_request(&self, file_path: &Path, _root: &Path) -> Option<String> {
        // Component-wise prefix: `/abs/foo-dir2/x` is not under `/abs/foo-dir`.
        let rest = file_path.strip_prefix(&self.target).ok()?;
        if rest.as_os_str().is_empty() {
            return None;
        }
        let rest = slash(rest);
        Some(format!("{}{}", self.key, encode_request_path(&rest)))
    }
}

/// Classified alias tables.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    /// Exact module id → module id.
    literal: AliasMap,
    /// Request prefix → absolute directory, in registration order.
    directory: IndexMap<String, PathBuf>,
}

impl AliasTable {
    /// Build the tables from resolver-supplied alias maps followed by the user's.
    ///
    /// Later registrations of the same key replace earlier ones, so user
    /// aliases override resolver aliases. Directory aliases whose target
    /// exists neither under `root` nor as given are dropped without error.
    pub fn build(root: &Path, resolvers: &[Box<dyn Resolver>], user: &AliasMap) -> Self {
        let mut table = Self::default();
        for resolver in resolvers {
            if let Some(aliases) = resolver.alias_map() {
                table.register(root, aliases);
            }
        }
        table.register(root, user);
        table
    }

    fn register(&mut self, root: &Path, aliases: &AliasMap) {
        for (key, target) in aliases {
            if is_dir_alias(key, target) {
                match resolve_alias_dir(root, target) {
                    Some(dir) => {
                        debug!(
                            alias = %key,
                            target = %dir.display(),
                            "registered directory alias"
                        );
                        self.directory.insert(key.clone(), dir);
                    }
                    None => {
                        debug!(
                            alias = %key,
                            target = %target,
                            "directory alias target not found, ignoring"
                        );
                    }
                }
            } else {
                self.literal.insert(key.clone(), target.clone());
            }
        }
    }

    /// Literal alias for a module id.
    #[must_use]
    pub fn literal(&self, id: &str) -> Option<&str> {
        self.literal.get(id).map(String::as_str)
    }

    /// Directory aliases in registration order.
    pub fn directories(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.directory
            .iter()
            .map(|(key, dir)| (key.as_str(), dir.as_path()))
    }

    /// The longest directory alias prefix that `public_path` falls under.
    #[must_use]
    pub fn directory_prefix_of(&self, public_path: &str) -> Option<&str> {
        self.directory
            .keys()
            .map(String::as_str)
            .filter(|key| public_path.starts_with(*key))
            .max_by_key(|key| key.len())
    }

    /// One resolver entry per directory alias, in registration order.
    #[must_use]
    pub fn dir_resolvers(&self) -> Vec<DirAliasResolver> {
        self.directory
            .iter()
            .map(|(key, dir)| DirAliasResolver::new(key.clone(), dir.clone()))
            .collect()
    }
}

/// A directory alias key starts and ends with `/` and maps to an absolute path.
fn is_dir_alias(key: &str, target: &str) -> bool {
    key.starts_with('/')
        && key.ends_with('/')
        && (target.starts_with('/') || Path::new(target).is_absolute())
}

/// Prefer the target relative to the project root, then the target as given.
fn resolve_alias_dir(root: &Path, target: &str) -> Option<PathBuf> {
    let from_root = join_segment(root, target);
    if is_dir(&from_root) {
        return Some(from_root);
    }
    let literal = PathBuf::from(target);
    is_dir(&literal).then_some(literal)
}
