//! Secret commands.
//!
//! Provides `nodekeys init|get|has|set|remove` against whichever backend the
//! store options resolve to.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use console::style;
use nodekeys_secrets::{SecretName, SecretStore};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use super::StoreOptions;

/// Length in bytes of generated private keys.
const KEY_LEN: usize = 32;

#[derive(clap::Subcommand)]
pub enum SecretsCommand {
    /// Generate node keys that are not stored yet
    Init {
        /// Do not generate the validator key
        #[arg(long)]
        no_validator: bool,

        /// Do not generate the network key
        #[arg(long)]
        no_network: bool,
    },

    /// Print a stored secret
    Get {
        /// Secret name (validator-key, network-key)
        name: String,

        /// Print the raw bytes hex-encoded
        #[arg(long)]
        hex: bool,
    },

    /// Report whether a secret is stored
    Has {
        /// Secret name
        name: String,
    },

    /// Store a secret; fails if one is already stored
    Set {
        /// Secret name
        name: String,

        /// Secret value
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        value: Option<String>,

        /// Read the secret value from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Delete a stored secret
    Remove {
        /// Secret name
        name: String,
    },
}

/// Run a secrets command.
pub async fn run(command: SecretsCommand, options: &StoreOptions) -> anyhow::Result<()> {
    let store = options.open().await?;

    match command {
        SecretsCommand::Init {
            no_validator,
            no_network,
        } => {
            let wanted = SecretName::ALL.into_iter().filter(|name| match name {
                SecretName::ValidatorKey => !no_validator,
                SecretName::NetworkKey => !no_network,
            });

            for name in wanted {
                if init_secret(store.as_ref(), name).await? {
                    println!("  {} {} generated", style("✓").green(), name);
                } else {
                    println!("  {} {} already present, skipped", style("-").yellow(), name);
                }
            }
        }

        SecretsCommand::Get { name, hex } => {
            let value = Zeroizing::new(store.get(&name).await?);
            let mut stdout = std::io::stdout().lock();
            if hex {
                writeln!(stdout, "{}", Zeroizing::new(hex::encode(value.as_slice())).as_str())?;
            } else {
                stdout.write_all(&value)?;
            }
            stdout.flush()?;
        }

        SecretsCommand::Has { name } => {
            if store.has(&name).await {
                println!("{name}: present");
            } else {
                println!("{name}: absent");
            }
        }

        SecretsCommand::Set { name, value, file } => {
            let value = match (value, file) {
                (Some(v), _) => Zeroizing::new(v.into_bytes()),
                (None, Some(path)) => Zeroizing::new(
                    tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                (None, None) => anyhow::bail!("Either --value or --file is required"),
            };

            if value.is_empty() {
                anyhow::bail!("Secret value must not be empty");
            }

            store.set(&name, &value).await?;
            println!("Secret '{name}' stored successfully.");
        }

        SecretsCommand::Remove { name } => {
            store.remove(&name).await?;
            println!("Secret '{name}' removed.");
        }
    }

    Ok(())
}

/// Generate and store a key for `name` unless one is already present.
///
/// Keys are stored hex-encoded. Returns whether a key was written.
async fn init_secret(store: &dyn SecretStore, name: SecretName) -> anyhow::Result<bool> {
    if store.has(name.as_str()).await {
        return Ok(false);
    }

    let encoded = generate_key();
    store
        .set(name.as_str(), encoded.as_bytes())
        .await
        .with_context(|| format!("Failed to store {name}"))?;

    tracing::info!(%name, "generated new key");
    Ok(true)
}

/// Fresh random key material from the OS RNG, hex-encoded.
fn generate_key() -> Zeroizing<String> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    OsRng.fill_bytes(key.as_mut_slice());
    Zeroizing::new(hex::encode(key.as_slice()))
}
