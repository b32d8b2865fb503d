//! nodekeys command-line interface.

pub mod commands;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::StoreOptions;

/// nodekeys - node key material storage
#[derive(Parser)]
#[command(name = "nodekeys")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a secrets backend config file
    #[arg(short, long, env = "NODEKEYS_CONFIG", global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Data directory for the local backend. On the command line it overrides
    /// NODEKEYS_CONFIG, and --config overrides NODEKEYS_DATA_DIR
    #[arg(short, long, env = "NODEKEYS_DATA_DIR", global = true)]
    pub data_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Parse the process arguments, exiting with usage on error.
    pub fn parse_args() -> Self {
        Self::try_parse_args_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parse `args`, settling `--config` against `--data-dir`.
    ///
    /// When both are set, the one given on the command line wins over the one
    /// taken from the environment. Both on the command line (or both from the
    /// environment) is a conflict.
    pub fn try_parse_args_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;

        if cli.config.is_some() && cli.data_dir.is_some() {
            match (
                from_command_line(&matches, "config"),
                from_command_line(&matches, "data_dir"),
            ) {
                (true, false) => cli.data_dir = None,
                (false, true) => cli.config = None,
                _ => {
                    return Err(Self::command().error(
                        ErrorKind::ArgumentConflict,
                        "--config and --data-dir cannot be used together",
                    ))
                }
            }
        }

        Ok(cli)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            config: self.config.clone(),
            data_dir: self.data_dir.clone(),
        }
    }
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Secrets(commands::secrets::SecretsCommand),

    /// Backend configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

fn from_command_line(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let options = cli.store_options();
    match cli.command {
        Commands::Secrets(command) => commands::secrets::run(command, &options).await,
        Commands::Config(args) => commands::config::run(args, &options).await,
        Commands::Version => {
            println!("nodekeys {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
