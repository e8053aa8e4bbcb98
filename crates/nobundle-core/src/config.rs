//! Resolver configuration discovery and parsing.
//!
//! Loads `nobundle.config.json` (or `.nobundlerc.json`) from the project root:
//!
//! ```json
//! {
//!   "alias": {
//!     "react": "preact/compat",
//!     "/@components/": "/src/components"
//!   }
//! }
//! ```
//!
//! Keys that start and end with `/` and map to an absolute path are directory
//! aliases; everything else is a literal module-id alias.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ordered alias map, in declaration order.
pub type AliasMap = IndexMap<String, String>;

/// Config file names in priority order.
const CONFIG_FILES: &[&str] = &["nobundle.config.json", ".nobundlerc.json"];

/// Resolver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// User aliases. Applied after resolver-supplied aliases, so they win.
    pub alias: AliasMap,
}

impl ResolverConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alias.
    #[must_use]
    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.alias.insert(from.into(), to.into());
        self
    }
}

/// Find a config file in the given root directory.
#[must_use]
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Load configuration from the given root directory.
///
/// If `config_path` is `Some`, that file must exist (relative paths are taken
/// from `root`). Otherwise the config file is auto-discovered, and a project
/// without one yields `Ok(None)`.
pub fn load_config(
    root: &Path,
    config_path: Option<&Path>,
) -> Result<Option<(PathBuf, ResolverConfig)>> {
    let path = match config_path {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => root.join(p),
        None => match find_config_file(root) {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    let source = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
        path: path.clone(),
        source,
    })?;

    let config = serde_json::from_str(&source).map_err(|source| Error::ConfigParse {
        path: path.clone(),
        source,
    })?;

    Ok(Some((path, config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_no_config_file() {
        let dir = tempdir().unwrap();
        assert!(load_config(dir.path(), None).unwrap().is_none());
    }

    #[test]
    fn test_load_discovered_config_preserves_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("nobundle.config.json"),
            r#"{ "alias": { "z": "zed", "/@a/": "/src/a", "b": "bee" } }"#,
        )
        .unwrap();

        let (path, config) = load_config(dir.path(), None).unwrap().unwrap();
        assert_eq!(path, dir.path().join("nobundle.config.json"));
        let keys: Vec<&str> = config.alias.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "/@a/", "b"]);
        assert_eq!(config.alias["/@a/"], "/src/a");
    }

    #[test]
    fn test_primary_name_wins() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".nobundlerc.json"), r#"{"alias":{"a":"rc"}}"#).unwrap();
        fs::write(
            dir.path().join("nobundle.config.json"),
            r#"{"alias":{"a":"config"}}"#,
        )
        .unwrap();

        let (_, config) = load_config(dir.path(), None).unwrap().unwrap();
        assert_eq!(config.alias["a"], "config");
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_config(dir.path(), Some(Path::new("custom.json"))).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_invalid_config_is_a_parse_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("nobundle.config.json"), "{ alias: }").unwrap();
        let err = load_config(dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_alias_defaults_to_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("nobundle.config.json"), "{}").unwrap();
        let (_, config) = load_config(dir.path(), None).unwrap().unwrap();
        assert_eq!(config, ResolverConfig::new());
    }

    #[test]
    fn test_builder() {
        let config = ResolverConfig::new()
            .with_alias("react", "preact/compat")
            .with_alias("/@c/", "/src/c");
        assert_eq!(config.alias.len(), 2);
        assert_eq!(config.alias["react"], "preact/compat");
    }
}
