//! Pluggable resolver entries.
//!
//! A resolver entry is one strategy in the resolution chain. Entries are tried
//! in registration order (user entries, then alias-derived entries); the first
//! one to return a value wins, independently for each direction.
//!
//! ## Example
//!
//! ```ignore
//! use nobundle_core::resolver::Resolver;
//! use std::path::{Path, PathBuf};
//!
//! struct VirtualDocs;
//!
//! impl Resolver for VirtualDocs {
//!     fn name(&self) -> &str { "virtual-docs" }
//!
//!     fn request_to_file(&self, public_path: &str, root: &Path) -> Option<PathBuf> {
//!         let rest = public_path.strip_prefix("/docs/")?;
//!         Some(root.join("content").join(rest))
//!     }
//! }
//! ```

use crate::config::AliasMap;
use std::path::{Path, PathBuf};

/// A unit of resolution strategy. Every hook is optional.
pub trait Resolver: Send + Sync {
    /// Entry name, for diagnostics.
    fn name(&self) -> &str;

    /// Map a public path (query and fragment already stripped) to a file.
    fn request_to_file(&self, _public_path: &str, _root: &Path) -> Option<PathBuf> {
        None
    }

    /// Map a file back to the public path a browser should request.
    fn file_to_request(&self, _file_path: &Path, _root: &Path) -> Option<String> {
        None
    }

    /// Static aliases contributed by this entry.
    ///
    /// Directory aliases found here register new entries at the end of the chain.
    fn alias_map(&self) -> Option<&AliasMap> {
        None
    }

    /// Function-style alias for a bare module id.
    fn alias(&self, _id: &str) -> Option<String> {
        None
    }
}

impl std::fmt::Debug for dyn Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").field("name", &self.name()).finish()
    }
}

/// Resolver entry that only contributes an alias map.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    name: String,
    aliases: AliasMap,
}

impl AliasResolver {
    /// Create an alias-only entry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: AliasMap::new(),
        }
    }

    /// Add an alias.
    #[must_use]
    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.insert(from.into(), to.into());
        self
    }
}

impl Resolver for AliasResolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn alias_map(&self) -> Option<&AliasMap> {
        Some(&self.aliases)
    }
}
