//! Backend configuration commands.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use nodekeys_core::{paths, BackendKind, ConfigError, SecretString, SecretsConfig};

use super::StoreOptions;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Write a secrets backend configuration file
    Generate {
        /// Backend kind (local, hashicorp-vault, aws-ssm, gcp-ssm)
        #[arg(long = "type")]
        backend: BackendKind,

        /// Access token for the backend
        #[arg(long, env = "NODEKEYS_BACKEND_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Backend server URL
        #[arg(long)]
        server_url: Option<String>,

        /// Node name used to namespace remote secrets
        #[arg(long)]
        name: Option<String>,

        /// Backend namespace
        #[arg(long)]
        namespace: Option<String>,

        /// Extra backend parameter as key=value (repeatable)
        #[arg(long = "extra", value_parser = parse_key_value)]
        extra: Vec<(String, String)>,

        /// Output file (defaults to ~/.nodekeys/secrets.json5)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved backend configuration
    Show,

    /// Validate the resolved backend configuration
    Validate,
}

/// Run a config command.
pub async fn run(args: ConfigArgs, options: &StoreOptions) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Generate {
            backend,
            token,
            server_url,
            name,
            namespace,
            extra,
            out,
            force,
        } => {
            let mut config = SecretsConfig::new(backend);
            config.token = token.map(SecretString::from);
            config.server_url = server_url;
            config.name = name;
            config.namespace = namespace;
            for (key, value) in extra {
                config.extra.insert(key, value.into());
            }
            config.validate()?;

            let path = match out {
                Some(path) => path,
                None => paths::config_file()?,
            };
            if path.exists() && !force {
                return Err(ConfigError::AlreadyExists(path).into());
            }

            config
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} configuration to {}", backend, path.display());
        }

        ConfigCommand::Show => {
            let config = options.resolve()?;
            println!("{:#?}", config);
        }

        ConfigCommand::Validate => {
            let config = options.resolve()?;
            config.validate()?;
            println!("Configuration valid ({} backend).", config.backend);
        }
    }

    Ok(())
}

/// Parse a `key=value` pair.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
