//! CLI command implementations.

pub mod config;
pub mod secrets;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use nodekeys_core::{paths, SecretsConfig};
use nodekeys_secrets::{BackendParams, BackendRegistry, SecretStore};

/// Where the secrets store comes from, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl StoreOptions {
    /// Resolve the backend configuration.
    ///
    /// Order: `--config`, then `--data-dir`, then the default config file if
    /// present, then a local store in the default data directory.
    pub fn resolve(&self) -> anyhow::Result<SecretsConfig> {
        if let Some(path) = &self.config {
            return load_config(path);
        }

        if let Some(dir) = &self.data_dir {
            return Ok(SecretsConfig::local(expand(dir)));
        }

        let default_config = paths::config_file()?;
        if default_config.exists() {
            return load_config(&default_config);
        }

        Ok(SecretsConfig::local(paths::data_dir()?))
    }

    /// Resolve the configuration and open the store it describes.
    pub async fn open(&self) -> anyhow::Result<Arc<dyn SecretStore>> {
        let config = self.resolve()?;
        let params = BackendParams::with_span(tracing::info_span!("nodekeys"));

        BackendRegistry::with_defaults()
            .open(&config, &params)
            .await
            .with_context(|| format!("Failed to open {} secrets backend", config.backend))
    }
}

fn load_config(path: &Path) -> anyhow::Result<SecretsConfig> {
    let path = expand(path);
    let config = SecretsConfig::load(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}

fn expand(path: &Path) -> PathBuf {
    paths::expand_tilde(&path.to_string_lossy())
}
