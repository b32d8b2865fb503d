//! The storage contract every backend implements.

use async_trait::async_trait;

use crate::error::Result;

/// Async trait for secret storage backends.
///
/// Secrets are addressed by logical name (see [`SecretName`](crate::SecretName))
/// and handled as raw bytes. Implementations must be usable from many tasks at
/// once.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Prepare the backend for use. Safe to call more than once.
    async fn setup(&self) -> Result<()>;

    /// Retrieve the raw bytes stored under `name`.
    async fn get(&self, name: &str) -> Result<Vec<u8>>;

    /// Store `value` under `name`.
    ///
    /// Fails with `AlreadyExists` when a value is present; an existing secret
    /// must be removed before it can be written again.
    async fn set(&self, name: &str, value: &[u8]) -> Result<()>;

    /// Whether [`get`](Self::get) would currently succeed for `name`.
    ///
    /// Errors of any kind read as "absent".
    async fn has(&self, name: &str) -> bool {
        self.get(name).await.is_ok()
    }

    /// Delete the secret stored under `name`.
    async fn remove(&self, name: &str) -> Result<()>;
}
