//! Error types for secret storage.

use std::path::PathBuf;

use nodekeys_core::{BackendKind, ConfigError};
use thiserror::Error;

/// Errors that can occur during secret operations.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The name is not one this store knows about.
    #[error("Secret not found: {0}")]
    NotFound(String),

    /// A value is already stored; secrets are never overwritten in place.
    #[error("Secret {name} already initialized at {}", path.display())]
    AlreadyExists { name: String, path: PathBuf },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unsupported secrets backend: {0}")]
    UnsupportedBackend(BackendKind),

    /// Failure reported by a remote backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl SecretError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result alias for secret operations.
pub type Result<T> = std::result::Result<T, SecretError>;
