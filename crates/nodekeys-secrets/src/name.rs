//! Logical secret names and their on-disk layout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::SecretError;

/// Directory holding consensus key material.
pub const CONSENSUS_DIR: &str = "consensus";

/// Directory holding networking key material.
pub const NETWORK_DIR: &str = "libp2p";

/// File name of the validator key inside [`CONSENSUS_DIR`].
pub const VALIDATOR_KEY_FILE: &str = "validator.key";

/// File name of the network identity key inside [`NETWORK_DIR`].
pub const NETWORK_KEY_FILE: &str = "libp2p.key";

/// The secrets a node knows how to store.
///
/// The set is closed: stores accept these names and reject everything else
/// with [`SecretError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SecretName {
    /// Consensus (validator) private key.
    ValidatorKey,
    /// Network identity private key.
    NetworkKey,
}

impl SecretName {
    pub const ALL: [SecretName; 2] = [SecretName::ValidatorKey, SecretName::NetworkKey];

    pub fn as_str(&self) -> &'static str {
        match self {
            SecretName::ValidatorKey => "validator-key",
            SecretName::NetworkKey => "network-key",
        }
    }

    /// Sub-directory of the data directory this secret lives in.
    pub fn directory(&self) -> &'static str {
        match self {
            SecretName::ValidatorKey => CONSENSUS_DIR,
            SecretName::NetworkKey => NETWORK_DIR,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            SecretName::ValidatorKey => VALIDATOR_KEY_FILE,
            SecretName::NetworkKey => NETWORK_KEY_FILE,
        }
    }

    /// Full path of this secret under `base`.
    pub fn path_under(&self, base: &Path) -> PathBuf {
        base.join(self.directory()).join(self.file_name())
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretName {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| SecretError::NotFound(s.to_string()))
    }
}
