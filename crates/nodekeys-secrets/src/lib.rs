//! Secret storage for node key material.
//!
//! Callers ask a [`BackendRegistry`] for a store matching their
//! [`SecretsConfig`](nodekeys_core::SecretsConfig) and then use the uniform
//! [`SecretStore`] operations, whatever the backend. The crate ships the
//! [`LocalSecretStore`], which keeps each key as a plain file under a data
//! directory; remote backends plug in through [`BackendRegistry::register`].

pub mod backend;
pub mod error;
pub mod local;
pub mod name;
pub mod store;

pub use backend::{setup_local_store, BackendParams, BackendRegistry};
pub use error::{Result, SecretError};
pub use local::LocalSecretStore;
pub use name::SecretName;
pub use store::SecretStore;
