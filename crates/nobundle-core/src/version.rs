use serde::Serialize;
use std::fmt;

/// Crate version, from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build identity reported by `nobundle version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Set when the build exported `NOBUNDLE_BUILD_GIT_HASH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_hash: Option<&'static str>,
}

impl VersionInfo {
    /// Version info of this build.
    #[must_use]
    pub fn current() -> Self {
        Self {
            name: "nobundle",
            version: VERSION,
            git_hash: option_env!("NOBUNDLE_BUILD_GIT_HASH"),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)?;
        if let Some(hash) = self.git_hash {
            write!(f, " ({hash})")?;
        }
        Ok(())
    }
}
