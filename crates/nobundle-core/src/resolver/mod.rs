//! Bidirectional module resolution for the no-bundle dev server.
//!
//! A [`ModuleResolver`] maps browser request paths (`/src/main`, `/@modules/vue`,
//! `/@components/Button.tsx`) to files on disk and back. It owns all of its
//! memo tables, so independent instances never share state.
//!
//! Resolution order for a request:
//! 1. `/@modules/<id>` goes through the module id table, the optimizer cache,
//!    then `node_modules`;
//! 2. each resolver entry in registration order (user entries, then one
//!    entry per directory alias);
//! 3. `<root>/public/<path>` if it exists, else `<root>/<path>`;
//! 4. fuzzy extension and index probing.

mod alias;
mod entry;
mod fuzzy;
mod memo;
mod node_modules;
mod optimizer;

pub use alias::{AliasTable, DirAliasResolver};
pub use entry::{AliasResolver, Resolver};
pub use fuzzy::{resolve_fuzzy, resolve_postfix, Postfix, SUPPORTED_EXTS};
pub use memo::Memo;
pub use node_modules::{NodeModuleInfo, NodeModuleLocator, MAIN_FIELDS};
pub use optimizer::{OptimizerCache, MANIFEST_FILE, OPTIMIZE_CACHE_DIR};

use crate::config::{load_config, ResolverConfig};
use crate::error::{Error, Result};
use crate::paths::{
    clean_url, encode_request_path, is_within, join_segment, parse_node_module_id,
    posix_dirname, posix_extname, posix_normalize, posix_resolve, query_of, relative_path,
    slash, split_deep_import, split_suffix,
};
use nobundle_util::fs::lookup_file;
use serde::Serialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Request prefix for resolved node modules.
pub const MODULE_PREFIX: &str = "/@modules/";

/// Virtual module carrying environment info, never resolved on disk.
pub const ENV_PUBLIC_PATH: &str = "/@env";

/// Static asset directory under the project root.
pub const PUBLIC_DIR: &str = "public";

/// Extensions served as JS modules without an `import` marker.
const JS_SRC_EXTS: &[&str] = &[".js", ".jsx", ".ts", ".tsx", ".mjs", ".vue"];

/// A relative import resolved in request space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelativeRequest {
    /// Absolute request path without query.
    pub pathname: String,
    /// `?query` of the importee, or `""`.
    pub query: String,
}

/// Request path ↔ file path resolver for one project root.
#[derive(Debug)]
pub struct ModuleResolver {
    root: PathBuf,
    resolvers: Vec<Box<dyn Resolver>>,
    aliases: AliasTable,
    request_cache: Memo<String, PathBuf>,
    file_cache: Memo<PathBuf, String>,
    module_files: Memo<String, PathBuf>,
    file_modules: Memo<PathBuf, String>,
    optimizer: OptimizerCache,
    node_modules: NodeModuleLocator,
}

impl ModuleResolver {
    /// Create a resolver for `root` with user resolver entries and configuration.
    ///
    /// Directory aliases from the entries and from `config` are appended to the
    /// chain after the user entries. Checks alias targets on disk.
    pub fn new(
        root: impl Into<PathBuf>,
        resolvers: Vec<Box<dyn Resolver>>,
        config: &ResolverConfig,
    ) -> Self {
        let root = root.into();
        let aliases = AliasTable::build(&root, &resolvers, &config.alias);

        let mut resolvers = resolvers;
        resolvers.extend(
            aliases
                .dir_resolvers()
                .into_iter()
                .map(|entry| Box::new(entry) as Box<dyn Resolver>),
        );
        debug!(
            root = %root.display(),
            entries = resolvers.len(),
            "created module resolver"
        );

        Self {
            root,
            resolvers,
            aliases,
            request_cache: Memo::new(),
            file_cache: Memo::new(),
            module_files: Memo::new(),
            file_modules: Memo::new(),
            optimizer: OptimizerCache::new(),
            node_modules: NodeModuleLocator::new(),
        }
    }

    /// Create a resolver for `root`, loading its config file if there is one.
    pub fn from_root(root: impl Into<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let root = root.into();
        let config = match load_config(&root, config_path)? {
            Some((path, config)) => {
                debug!(path = %path.display(), "loaded resolver config");
                config
            }
            None => ResolverConfig::default(),
        };
        Ok(Self::new(root, Vec::new(), &config))
    }

    /// The project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The classified alias tables.
    #[must_use]
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Map a request path to a file.
    ///
    /// Query and fragment are ignored. The file is not guaranteed to exist.
    /// Touches the file system on a cache miss.
    pub fn request_to_file(&self, public_path: &str) -> PathBuf {
        let clean = clean_url(public_path);
        let decoded = urlencoding::decode(clean).unwrap_or(Cow::Borrowed(clean));

        if let Some(hit) = self.request_cache.get(&*decoded) {
            trace!(public_path, "request cache hit");
            return hit;
        }

        let resolved = self.resolve_request(&decoded);
        self.request_cache
            .insert(decoded.into_owned(), resolved.clone());
        resolved
    }

    fn resolve_request(&self, public_path: &str) -> PathBuf {
        if let Some(id) = public_path.strip_prefix(MODULE_PREFIX) {
            if let Some(file) = self.resolve_module_id(id) {
                return file;
            }
        }

        let file = self
            .resolvers
            .iter()
            .find_map(|entry| entry.request_to_file(public_path, &self.root))
            .unwrap_or_else(|| self.default_request_to_file(public_path));
        resolve_fuzzy(file)
    }

    fn resolve_module_id(&self, id: &str) -> Option<PathBuf> {
        if let Some(file) = self.module_files.get(id) {
            return Some(file);
        }
        if let Some(file) = self.optimizer.resolve_module(&self.root, id) {
            return Some(file);
        }
        let file = self.node_modules.resolve_file(&self.root, id)?;
        self.remember_module(id, &file);
        Some(file)
    }

    /// Record that `/@modules/<id>` serves `file`, in both directions.
    fn remember_module(&self, id: &str, file: &Path) {
        self.module_files.insert(id.to_string(), file.to_path_buf());
        self.file_modules
            .insert(file.to_path_buf(), format!("{MODULE_PREFIX}{id}"));
    }

    fn default_request_to_file(&self, public_path: &str) -> PathBuf {
        let public_file = join_segment(&self.root.join(PUBLIC_DIR), public_path);
        if public_file.exists() {
            return public_file;
        }
        join_segment(&self.root, public_path)
    }

    /// Map a file to the request path a browser should use for it.
    ///
    /// Touches the file system only through resolver entries.
    pub fn file_to_request(&self, file_path: &Path) -> String {
        if let Some(hit) = self.file_cache.get(file_path) {
            trace!(file = %file_path.display(), "file cache hit");
            return hit;
        }

        let request = self
            .resolvers
            .iter()
            .find_map(|entry| entry.file_to_request(file_path, &self.root))
            .or_else(|| self.file_modules.get(file_path))
            .unwrap_or_else(|| self.default_file_to_request(file_path));
        self.file_cache
            .insert(file_path.to_path_buf(), request.clone());
        request
    }

    fn default_file_to_request(&self, file_path: &Path) -> String {
        let relative = relative_path(&self.root, file_path)
            .map_or_else(|| slash(file_path), |rel| slash(&rel));
        let relative = relative
            .strip_prefix("public/")
            .unwrap_or(&relative)
            .trim_start_matches('/');
        format!("/{}", encode_request_path(relative))
    }

    /// Canonicalize a fuzzy request path into the exact path a browser must use.
    ///
    /// The query and fragment are preserved. Node-module files are re-expressed
    /// under [`MODULE_PREFIX`]. Touches the file system on a cache miss.
    ///
    /// # Errors
    /// [`Error::InconsistentNormalization`] if the result does not resolve to
    /// the same file as the input, [`Error::PackageJsonNotFound`] if a deep
    /// module import has no enclosing `package.json`. Both are resolver bugs.
    pub fn normalize_public_path(&self, public_path: &str) -> Result<String> {
        if public_path == ENV_PUBLIC_PATH {
            return Ok(public_path.to_string());
        }

        let (clean, suffix) = split_suffix(public_path);
        let finalize = |normalized: String| -> Result<String> {
            let normalized = normalized + suffix;
            if self.request_to_file(&normalized) != self.request_to_file(public_path) {
                return Err(Error::InconsistentNormalization {
                    normalized,
                    original: public_path.to_string(),
                });
            }
            Ok(normalized)
        };

        let Some(id) = clean.strip_prefix(MODULE_PREFIX) else {
            return finalize(self.file_to_request(&self.request_to_file(clean)));
        };

        let file_path = self.request_to_file(clean);
        if let Some(cache_dir) = self.optimizer.cache_dir(&self.root) {
            if let Ok(relative) = file_path.strip_prefix(&cache_dir) {
                return finalize(posix_normalize(&format!(
                    "{MODULE_PREFIX}{}",
                    slash(relative)
                )));
            }
        }

        // Package files are addressed through their package, never through
        // `file_to_request`: symlinked and aliased installs break that mapping.
        let parsed = parse_node_module_id(id);
        if parsed.in_pkg_path.is_empty() {
            return Ok(public_path.to_string());
        }

        let not_found = || Error::PackageJsonNotFound {
            public_path: public_path.to_string(),
        };
        let mut search_from = file_path.clone();
        let in_pkg_file = loop {
            // Packages may nest manifests, e.g. `@babel/runtime/helpers/esm/package.json`.
            let manifest = lookup_file(&search_from, &[MANIFEST_FILE]).ok_or_else(not_found)?;
            let Some(pkg_dir) = manifest.parent() else {
                return Err(not_found());
            };
            let in_pkg_file = relative_path(pkg_dir, &file_path)
                .map(|rel| slash(&rel))
                .unwrap_or_default();
            if in_pkg_file.starts_with(parsed.in_pkg_path) {
                break in_pkg_file;
            }
            search_from = pkg_dir.parent().ok_or_else(not_found)?.to_path_buf();
        };

        let normalized = ["/@modules", parsed.scope, parsed.name, &in_pkg_file]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        finalize(normalized)
    }

    /// Alias for a bare module id.
    ///
    /// Literal aliases win over function aliases of resolver entries.
    #[must_use]
    pub fn alias(&self, id: &str) -> Option<String> {
        if let Some(aliased) = self.aliases.literal(id) {
            return Some(aliased.to_string());
        }
        self.resolvers.iter().find_map(|entry| entry.alias(id))
    }

    /// Resolve `importee` as imported from the request path `importer`.
    ///
    /// Non-relative importees pass through without their query. A relative
    /// import that escapes the importer's directory alias is resolved in file
    /// space instead. A trailing slash on the importee is kept. Touches the
    /// file system only in the alias-escape case.
    pub fn resolve_relative_request(&self, importer: &str, importee: &str) -> RelativeRequest {
        let query = query_of(importee).to_string();
        let clean_importee = clean_url(importee);
        if !clean_importee.starts_with('.') {
            return RelativeRequest {
                pathname: clean_importee.to_string(),
                query,
            };
        }

        let importer = clean_url(importer);
        let mut resolved = posix_resolve(posix_dirname(importer), clean_importee);
        if let Some(prefix) = self.aliases.directory_prefix_of(importer) {
            if !resolved.starts_with(prefix) {
                let importer_file = self.request_to_file(importer);
                let importer_dir = importer_file.parent().unwrap_or(&self.root);
                resolved = self.file_to_request(&join_segment(importer_dir, clean_importee));
            }
        }

        if clean_importee.ends_with('/') && !resolved.ends_with('/') {
            resolved.push('/');
        }
        RelativeRequest {
            pathname: resolved,
            query,
        }
    }

    /// Whether `public_path` is served from `<root>/public`.
    ///
    /// Touches the file system on a cache miss.
    pub fn is_public_request(&self, public_path: &str) -> bool {
        is_within(
            &self.request_to_file(public_path),
            &self.root.join(PUBLIC_DIR),
        )
    }

    /// The pre-bundled dependency cache directory, if the project has a manifest.
    pub fn optimize_cache_dir(&self) -> Option<PathBuf> {
        self.optimizer.cache_dir(&self.root)
    }

    /// Whether `file_path` lives in the pre-bundled dependency cache.
    pub fn is_optimize_cache_file(&self, file_path: &Path) -> bool {
        self.optimize_cache_dir()
            .is_some_and(|dir| is_within(file_path, &dir))
    }

    /// The pre-bundled file for module `id`, if the optimizer produced one.
    pub fn resolve_optimized_module(&self, id: &str) -> Option<PathBuf> {
        self.optimizer.resolve_module(&self.root, id)
    }

    /// Resolve bare module `id` to a file from the project root.
    pub fn resolve_node_module_file(&self, id: &str) -> Option<PathBuf> {
        self.node_modules.resolve_file(&self.root, id)
    }

    /// Resolve the entry of package `id`, searching from `basedir`.
    ///
    /// The package's alias, if any, decides the entry file. An entry read from
    /// the manifest is registered as a module id, so `/@modules/<entry>`
    /// serves the same file even when the package lives in a nested
    /// `node_modules`.
    pub fn resolve_node_module(&self, basedir: &Path, id: &str) -> Option<NodeModuleInfo> {
        let aliased = self.alias(id);
        let info = self
            .node_modules
            .resolve_package(basedir, id, aliased.as_deref())?;
        if aliased.is_none() || aliased.as_deref() == Some(id) {
            if let (Some(entry), Some(file)) = (&info.entry, &info.entry_file_path) {
                self.remember_module(entry, file);
            }
        }
        Some(info)
    }

    /// Turn a bare import in `importer` into the id placed after [`MODULE_PREFIX`].
    ///
    /// Non-JS ids get an `import` query marker. Touches the file system.
    pub fn resolve_bare_module_request(&self, importer: &str, id: &str) -> String {
        let (id, suffix) = split_suffix(id);
        let resolved = self.resolve_bare_id(importer, id);
        let mut request = format!("{resolved}{suffix}");
        let extname = posix_extname(&resolved);
        if !JS_SRC_EXTS.iter().any(|ext| *ext == extname) {
            request.push_str(if suffix.contains('?') { "&import" } else { "?import" });
        }
        request
    }

    fn resolve_bare_id(&self, importer: &str, id: &str) -> String {
        if self.resolve_optimized_module(id).is_some() {
            // Pre-bundled files import each other with `.js` specifiers.
            return if id.ends_with(".js") {
                id.to_string()
            } else {
                format!("{id}.js")
            };
        }

        let importer_file = self.request_to_file(importer);
        let basedir = importer_file.parent().unwrap_or(&self.root);
        if let Some(info) = self.resolve_node_module(basedir, id) {
            match info.entry {
                Some(entry) => return entry,
                None => warn!(id, "dependency does not have a default entry in package.json"),
            }
        }

        let Some((pkg_id, deep_path)) = split_deep_import(id) else {
            return id.to_string();
        };

        if self.resolve_optimized_module(pkg_id).is_some() {
            if self.alias(pkg_id).as_deref() == Some(id) {
                // Deep import reached through an alias of the package id.
                return self.resolve_bare_id(importer, pkg_id);
            }
            if !self.is_optimize_cache_file(&importer_file) {
                warn!(
                    id,
                    package = pkg_id,
                    "deep import into a pre-bundled dependency; import the package root instead"
                );
            }
        }

        let Some(file) = self.node_modules.resolve_file(basedir, id) else {
            return id.to_string();
        };
        let file_path = slash(&file);
        let Some(idx) = file_path.rfind(deep_path) else {
            return id.to_string();
        };
        let resolved = format!("{id}{}", &file_path[idx + deep_path.len()..]);
        self.remember_module(&resolved, &file);
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn project() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        (dir, root)
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn resolver(root: &Path) -> ModuleResolver {
        ModuleResolver::new(root, Vec::new(), &ResolverConfig::default())
    }

    struct VirtualDocs;

    impl Resolver for VirtualDocs {
        fn name(&self) -> &str {
            "virtual-docs"
        }

        fn request_to_file(&self, public_path: &str, root: &Path) -> Option<PathBuf> {
            let rest = public_path.strip_prefix("/docs/")?;
            Some(join_segment(&root.join("content"), rest))
        }

        fn file_to_request(&self, file_path: &Path, root: &Path) -> Option<String> {
            let rest = file_path.strip_prefix(root.join("content")).ok()?;
            Some(format!("/docs/{}", slash(rest)))
        }

        fn alias(&self, id: &str) -> Option<String> {
            id.strip_prefix("virtual:").map(|rest| format!("virtual-{rest}"))
        }
    }

    #[test]
    fn test_request_to_file_defaults_to_root() {
        let (_dir, root) = project();
        write(&root.join("src/main.ts"), "");
        let resolver = resolver(&root);

        assert_eq!(
            resolver.request_to_file("/src/main.ts"),
            root.join("src").join("main.ts")
        );
        assert_eq!(
            resolver.request_to_file("/src/main"),
            root.join("src").join("main.ts")
        );
        assert_eq!(
            resolver.request_to_file("/missing.js"),
            root.join("missing.js")
        );
    }

    #[test]
    fn test_request_to_file_ignores_suffix_and_decodes() {
        let (_dir, root) = project();
        write(&root.join("src/my file.js"), "");
        let resolver = resolver(&root);

        let expected = root.join("src").join("my file.js");
        assert_eq!(resolver.request_to_file("/src/my%20file.js?t=123"), expected);
        assert_eq!(resolver.request_to_file("/src/my file.js#top"), expected);
        assert_eq!(resolver.request_cache.len(), 1);
    }

    #[test]
    fn test_request_to_file_prefers_public_dir() {
        let (_dir, root) = project();
        write(&root.join("public/logo.png"), "");
        let resolver = resolver(&root);

        assert_eq!(
            resolver.request_to_file("/logo.png"),
            root.join("public").join("logo.png")
        );
        assert_eq!(resolver.file_to_request(&root.join("public/logo.png")), "/logo.png");
    }

    #[test]
    fn test_user_entries_run_first_in_both_directions() {
        let (_dir, root) = project();
        write(&root.join("content/intro.md"), "");
        let resolver = ModuleResolver::new(
            &root,
            vec![Box::new(VirtualDocs)],
            &ResolverConfig::default(),
        );

        let file = resolver.request_to_file("/docs/intro.md");
        assert_eq!(file, root.join("content").join("intro.md"));
        assert_eq!(resolver.file_to_request(&file), "/docs/intro.md");
    }

    #[test]
    fn test_module_prefix_records_id_tables() {
        let (_dir, root) = project();
        let pkg = root.join("node_modules/tiny");
        write(&pkg.join("package.json"), r#"{"main": "lib/tiny.js"}"#);
        write(&pkg.join("lib/tiny.js"), "");
        let resolver = resolver(&root);

        let file = resolver.request_to_file("/@modules/tiny");
        assert_eq!(file, pkg.join("lib").join("tiny.js"));
        assert_eq!(resolver.module_files.get("tiny"), Some(file.clone()));
        assert_eq!(resolver.file_to_request(&file), "/@modules/tiny");
    }

    #[test]
    fn test_unresolvable_module_falls_back_to_root() {
        let (_dir, root) = project();
        let resolver = resolver(&root);

        assert_eq!(
            resolver.request_to_file("/@modules/ghost"),
            root.join("@modules").join("ghost")
        );
    }

    #[test]
    fn test_file_to_request_outside_root() {
        let (_dir, root) = project();
        let app = root.join("app");
        fs::create_dir_all(&app).unwrap();
        write(&root.join("shared/x.js"), "");
        let resolver = resolver(&app);

        let request = resolver.file_to_request(&root.join("shared/x.js"));
        assert_eq!(request, "/../shared/x.js");
        assert_eq!(resolver.request_to_file(&request), root.join("shared").join("x.js"));
    }

    #[test]
    fn test_normalize_keeps_env_path_and_suffix() {
        let (_dir, root) = project();
        write(&root.join("src/App.tsx"), "");
        let resolver = resolver(&root);

        assert_eq!(resolver.normalize_public_path(ENV_PUBLIC_PATH).unwrap(), "/@env");
        assert_eq!(
            resolver.normalize_public_path("/src/App?import#x").unwrap(),
            "/src/App.tsx?import#x"
        );
    }

    #[test]
    fn test_normalize_detects_inconsistent_entry() {
        struct OneWay;

        impl Resolver for OneWay {
            fn name(&self) -> &str {
                "one-way"
            }

            fn file_to_request(&self, _file_path: &Path, _root: &Path) -> Option<String> {
                Some("/elsewhere.js".to_string())
            }
        }

        let (_dir, root) = project();
        write(&root.join("a.js"), "");
        let resolver =
            ModuleResolver::new(&root, vec![Box::new(OneWay)], &ResolverConfig::default());

        let err = resolver.normalize_public_path("/a.js").unwrap_err();
        assert!(err.is_internal());
        assert!(matches!(err, Error::InconsistentNormalization { .. }));
    }

    #[test]
    fn test_normalize_optimized_module() {
        let (_dir, root) = project();
        write(&root.join("package.json"), "{}");
        write(&root.join("node_modules/.nobundle/lodash.js"), "");
        let resolver = resolver(&root);

        assert_eq!(
            resolver.normalize_public_path("/@modules/lodash").unwrap(),
            "/@modules/lodash.js"
        );
    }

    #[test]
    fn test_normalize_deep_module_with_nested_manifest() {
        let (_dir, root) = project();
        let pkg = root.join("node_modules/@babel/runtime");
        write(&pkg.join("package.json"), r#"{"name": "@babel/runtime"}"#);
        write(
            &pkg.join("helpers/esm/package.json"),
            r#"{"type": "module"}"#,
        );
        write(&pkg.join("helpers/esm/slicedToArray.js"), "");
        let resolver = resolver(&root);

        assert_eq!(
            resolver
                .normalize_public_path("/@modules/@babel/runtime/helpers/esm/slicedToArray")
                .unwrap(),
            "/@modules/@babel/runtime/helpers/esm/slicedToArray.js"
        );
    }

    #[test]
    fn test_normalize_package_root_is_unchanged() {
        let (_dir, root) = project();
        let pkg = root.join("node_modules/vue");
        write(&pkg.join("package.json"), r#"{"module": "dist/vue.esm.js"}"#);
        write(&pkg.join("dist/vue.esm.js"), "");
        let resolver = resolver(&root);

        assert_eq!(
            resolver.normalize_public_path("/@modules/vue?v=1").unwrap(),
            "/@modules/vue?v=1"
        );
    }

    #[test]
    fn test_alias_lookup_order() {
        let (_dir, root) = project();
        let config = ResolverConfig::new().with_alias("virtual:a", "literal-a");
        let resolver = ModuleResolver::new(&root, vec![Box::new(VirtualDocs)], &config);

        assert_eq!(resolver.alias("virtual:a").as_deref(), Some("literal-a"));
        assert_eq!(resolver.alias("virtual:b").as_deref(), Some("virtual-b"));
        assert_eq!(resolver.alias("react"), None);
    }

    #[test]
    fn test_resolve_relative_request() {
        let (_dir, root) = project();
        let resolver = resolver(&root);

        assert_eq!(
            resolver.resolve_relative_request("/src/a/b.js", "../c.js?raw"),
            RelativeRequest {
                pathname: "/src/c.js".to_string(),
                query: "?raw".to_string(),
            }
        );
        assert_eq!(
            resolver
                .resolve_relative_request("/src/a/b.js", "./dir/")
                .pathname,
            "/src/a/dir/"
        );
        assert_eq!(
            resolver.resolve_relative_request("/src/a/b.js", "vue?x"),
            RelativeRequest {
                pathname: "vue".to_string(),
                query: "?x".to_string(),
            }
        );
    }

    #[test]
    fn test_is_public_request() {
        let (_dir, root) = project();
        write(&root.join("public/robots.txt"), "");
        write(&root.join("publicity/x.js"), "");
        let resolver = resolver(&root);

        assert!(resolver.is_public_request("/robots.txt"));
        assert!(!resolver.is_public_request("/publicity/x.js"));
    }

    #[test]
    fn test_bare_request_optimized() {
        let (_dir, root) = project();
        write(&root.join("package.json"), "{}");
        write(&root.join("node_modules/.nobundle/lodash.js"), "");
        write(&root.join("node_modules/.nobundle/already.js"), "");
        let resolver = resolver(&root);

        assert_eq!(
            resolver.resolve_bare_module_request("/src/main.js", "lodash"),
            "lodash.js"
        );
        assert_eq!(
            resolver.resolve_bare_module_request("/src/main.js", "already.js"),
            "already.js"
        );
    }

    #[test]
    fn test_bare_request_package_entry() {
        let (_dir, root) = project();
        write(&root.join("src/main.js"), "");
        let pkg = root.join("node_modules/vue");
        write(&pkg.join("package.json"), r#"{"module": "dist/vue.esm.js"}"#);
        write(&pkg.join("dist/vue.esm.js"), "");
        let resolver = resolver(&root);

        assert_eq!(
            resolver.resolve_bare_module_request("/src/main.js", "vue"),
            "vue/dist/vue.esm.js"
        );
    }

    #[test]
    fn test_bare_request_deep_import_postfix_and_marker() {
        let (_dir, root) = project();
        write(&root.join("src/main.js"), "");
        let pkg = root.join("node_modules/ui");
        write(&pkg.join("index.js"), "");
        write(&pkg.join("button/index.js"), "");
        write(&pkg.join("style.css"), "");
        let resolver = resolver(&root);

        assert_eq!(
            resolver.resolve_bare_module_request("/src/main.js", "ui/button"),
            "ui/button/index.js"
        );
        assert_eq!(
            resolver.resolve_bare_module_request("/src/main.js", "ui/style.css"),
            "ui/style.css?import"
        );
        assert_eq!(
            resolver.resolve_bare_module_request("/src/main.js", "ui/style.css?inline"),
            "ui/style.css?inline&import"
        );
    }

    #[test]
    fn test_bare_request_aliased_deep_import_redirects_to_optimized() {
        let (_dir, root) = project();
        write(&root.join("package.json"), "{}");
        write(&root.join("node_modules/.nobundle/vue.js"), "");
        write(&root.join("node_modules/vue/dist/vue.esm.js"), "");
        let config = ResolverConfig::new().with_alias("vue", "vue/dist/vue.esm.js");
        let resolver = ModuleResolver::new(&root, Vec::new(), &config);

        assert_eq!(
            resolver.resolve_bare_module_request("/src/main.js", "vue/dist/vue.esm.js"),
            "vue.js"
        );
    }

    #[test]
    fn test_bare_request_from_nested_node_modules_resolves_back() {
        let (_dir, root) = project();
        write(&root.join("packages/app/main.js"), "");
        let pkg = root.join("packages/app/node_modules/foo");
        write(&pkg.join("package.json"), r#"{"module": "dist/foo.js"}"#);
        write(&pkg.join("dist/foo.js"), "");
        write(&pkg.join("lib/util.js"), "");
        let resolver = resolver(&root);

        let entry = resolver.resolve_bare_module_request("/packages/app/main.js", "foo");
        assert_eq!(entry, "foo/dist/foo.js");
        let entry_file = pkg.join("dist").join("foo.js");
        assert_eq!(resolver.request_to_file("/@modules/foo/dist/foo.js"), entry_file);
        assert_eq!(resolver.file_to_request(&entry_file), "/@modules/foo/dist/foo.js");
        assert_eq!(
            resolver
                .normalize_public_path("/@modules/foo/dist/foo.js")
                .unwrap(),
            "/@modules/foo/dist/foo.js"
        );

        let deep = resolver.resolve_bare_module_request("/packages/app/main.js", "foo/lib/util");
        assert_eq!(deep, "foo/lib/util.js");
        assert_eq!(
            resolver.request_to_file("/@modules/foo/lib/util.js"),
            pkg.join("lib").join("util.js")
        );
    }

    #[test]
    fn test_normalize_deep_module_without_enclosing_manifest() {
        let (_dir, root) = project();
        write(&root.join("package.json"), "{}");
        write(&root.join("node_modules/pkg/sub.js"), "");
        let resolver = resolver(&root);

        assert_eq!(
            resolver.request_to_file("/@modules/pkg/sub"),
            root.join("node_modules").join("pkg").join("sub.js")
        );
        let err = resolver
            .normalize_public_path("/@modules/pkg/sub")
            .unwrap_err();
        assert!(matches!(err, Error::PackageJsonNotFound { .. }));
        assert!(err.is_internal());
    }

    #[test]
    fn test_file_to_request_escapes_reserved_characters() {
        let (_dir, root) = project();
        let mut names = vec!["a%41.js", "b#c.js"];
        if cfg!(unix) {
            names.push("d?e.js");
        }
        for name in &names {
            write(&root.join("src").join(name), "");
        }
        let resolver = resolver(&root);

        assert_eq!(
            resolver.file_to_request(&root.join("src/a%41.js")),
            "/src/a%2541.js"
        );
        for name in &names {
            let file = root.join("src").join(name);
            let request = resolver.file_to_request(&file);
            assert_eq!(resolver.request_to_file(&request), file, "{request}");
            assert_eq!(resolver.normalize_public_path(&request).unwrap(), request);
        }
    }

    #[test]
    fn test_resolver_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModuleResolver>();
    }
}
