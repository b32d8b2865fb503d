//! # nodekeys-core
//!
//! Shared functionality for the nodekeys crates:
//!
//! - **Configuration**: the secrets backend descriptor, its JSON5 loader and validation
//! - **Paths**: default locations for configuration and key material
//! - **Secrets**: a redacting string type for credentials held in configuration

pub mod config;
pub mod error;
pub mod paths;
pub mod secret;

pub use config::{BackendKind, SecretsConfig};
pub use error::{ConfigError, Result};
pub use secret::SecretString;
