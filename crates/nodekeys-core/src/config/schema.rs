//! Secrets backend configuration schema.

use crate::error::ConfigError;
use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// `extra` key holding the local backend's base directory.
pub const EXTRA_PATH: &str = "path";

/// `extra` key holding the AWS region for the SSM backend.
pub const EXTRA_REGION: &str = "region";

/// `extra` key holding the GCP project for the Secret Manager backend.
pub const EXTRA_PROJECT_ID: &str = "project-id";

/// Where secrets physically live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Plain files under a local data directory.
    Local,
    /// HashiCorp Vault KV engine.
    HashicorpVault,
    /// AWS Systems Manager Parameter Store.
    AwsSsm,
    /// Google Cloud Secret Manager.
    GcpSsm,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Local,
        BackendKind::HashicorpVault,
        BackendKind::AwsSsm,
        BackendKind::GcpSsm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::HashicorpVault => "hashicorp-vault",
            BackendKind::AwsSsm => "aws-ssm",
            BackendKind::GcpSsm => "gcp-ssm",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownBackend(s.to_string()))
    }
}

/// Descriptor handed to the backend selector.
///
/// Only `type` is interpreted by the selector itself. The remaining fields are
/// connection parameters whose meaning depends on the backend; anything that
/// does not fit a named field goes into `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    #[serde(rename = "type")]
    pub backend: BackendKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<SecretString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Node name, used by remote backends to namespace the node's secrets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SecretsConfig {
    /// An empty descriptor for the given backend.
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            token: None,
            server_url: None,
            name: None,
            namespace: None,
            extra: BTreeMap::new(),
        }
    }

    /// A local backend rooted at `path`.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let mut config = Self::new(BackendKind::Local);
        config.extra.insert(
            EXTRA_PATH.to_string(),
            serde_json::Value::String(path.to_string_lossy().into_owned()),
        );
        config
    }

    /// Look up a string parameter in `extra`.
    ///
    /// Returns `Ok(None)` when the key is absent and an error when it holds
    /// something other than a string.
    pub fn extra_str(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        match self.extra.get(key) {
            None => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(ConfigError::Validation(format!(
                "extra.{key} must be a string, got {other}"
            ))),
        }
    }
}
