//! Secrets backend configuration.

mod loader;
mod schema;

pub use schema::*;
