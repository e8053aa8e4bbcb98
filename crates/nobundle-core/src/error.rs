use std::path::PathBuf;
use thiserror::Error;

/// Core error type for nobundle resolution.
///
/// Soft misses (an alias that does not apply, a probe that finds nothing)
/// are never errors; they surface as `None` from the resolver.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "[nobundle/resolver] internal error: normalized public path \"{normalized}\" is not \
         equivalent to original public path \"{original}\". This is a bug in the resolver."
    )]
    InconsistentNormalization { normalized: String, original: String },

    #[error(
        "[nobundle/resolver] internal error: can't find package.json for a node module file: \
         \"{public_path}\""
    )]
    PackageJsonNotFound { public_path: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this error signals a resolver-chain bug rather than a missing file.
    ///
    /// Serving layers answer these with an internal error, never a 404.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::InconsistentNormalization { .. } | Self::PackageJsonNotFound { .. }
        )
    }
}

/// Result alias for resolver operations.
pub type Result<T> = std::result::Result<T, Error>;
