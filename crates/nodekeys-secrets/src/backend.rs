//! Backend selection.
//!
//! A [`BackendRegistry`] maps each [`BackendKind`] to a constructor. Opening a
//! store looks up the constructor for the configured kind, builds the store,
//! and runs its [`setup`](SecretStore::setup) before handing it out; a setup
//! failure fails the open.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use nodekeys_core::config::EXTRA_PATH;
use nodekeys_core::{BackendKind, ConfigError, SecretsConfig};
use tracing::{info_span, Span};

use crate::error::{Result, SecretError};
use crate::local::LocalSecretStore;
use crate::store::SecretStore;

/// Builds a backend from its configuration.
///
/// Constructors should fail fast with a descriptive error when credentials or
/// parameters are missing or invalid. They must not call `setup`; the registry
/// does that.
pub type BackendConstructor =
    Arc<dyn Fn(&SecretsConfig, &BackendParams) -> Result<Arc<dyn SecretStore>> + Send + Sync>;

/// Runtime parameters shared by every backend.
#[derive(Debug, Clone)]
pub struct BackendParams {
    /// Parent span for backend events. A disabled span silences the backend.
    pub span: Span,
}

impl BackendParams {
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    /// Span for a backend of `kind`, nested under [`span`](Self::span).
    pub fn backend_span(&self, kind: BackendKind) -> Span {
        if self.span.is_disabled() {
            Span::none()
        } else {
            info_span!(parent: &self.span, "secrets", backend = %kind)
        }
    }
}

impl Default for BackendParams {
    /// No logging.
    fn default() -> Self {
        Self { span: Span::none() }
    }
}

/// Registry of backend constructors keyed by kind.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    constructors: HashMap<BackendKind, BackendConstructor>,
}

impl BackendRegistry {
    /// An empty registry. Every kind is unsupported until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in backends (currently only `local`).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(BackendKind::Local, create_local_store);
        registry
    }

    /// Register `constructor` for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: BackendKind, constructor: F) -> &mut Self
    where
        F: Fn(&SecretsConfig, &BackendParams) -> Result<Arc<dyn SecretStore>>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(kind, Arc::new(constructor));
        self
    }

    pub fn supports(&self, kind: BackendKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    /// Registered kinds, in a stable order.
    pub fn kinds(&self) -> Vec<BackendKind> {
        let mut kinds: Vec<_> = self.constructors.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Build and set up the store described by `config`.
    pub async fn open(
        &self,
        config: &SecretsConfig,
        params: &BackendParams,
    ) -> Result<Arc<dyn SecretStore>> {
        let constructor = self
            .constructors
            .get(&config.backend)
            .ok_or(SecretError::UnsupportedBackend(config.backend))?;

        let store = constructor(config, params)?;
        store.setup().await?;

        if !params.span.is_disabled() {
            tracing::info!(parent: &params.span, backend = %config.backend, "secrets backend ready");
        }
        Ok(store)
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Constructor for [`BackendKind::Local`]; reads the data directory from `extra.path`.
pub fn create_local_store(
    config: &SecretsConfig,
    params: &BackendParams,
) -> Result<Arc<dyn SecretStore>> {
    let path = config.extra_str(EXTRA_PATH)?.ok_or_else(|| {
        ConfigError::Validation("no path specified for local secrets backend".to_string())
    })?;

    Ok(Arc::new(LocalSecretStore::new(
        PathBuf::from(path),
        params.backend_span(BackendKind::Local),
    )))
}

/// Open a silent local store rooted at `data_dir`.
pub async fn setup_local_store(data_dir: impl Into<PathBuf>) -> Result<Arc<dyn SecretStore>> {
    let store = Arc::new(LocalSecretStore::new(data_dir, Span::none()));
    store.setup().await?;
    Ok(store)
}
