#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! Module resolution core for the nobundle dev server.
//!
//! Translates browser request paths to files on disk and back, applying
//! aliases, `node_modules` lookup, the pre-bundled dependency cache and fuzzy
//! extension probing. See [`ModuleResolver`].

pub mod config;
pub mod error;
pub mod paths;
pub mod resolver;
pub mod version;

pub use config::{load_config, ResolverConfig};
pub use error::{Error, Result};
pub use resolver::{
    AliasResolver, ModuleResolver, NodeModuleInfo, RelativeRequest, Resolver, ENV_PUBLIC_PATH,
    MODULE_PREFIX, OPTIMIZE_CACHE_DIR, PUBLIC_DIR,
};
pub use version::VERSION;
