//! Command-line interface for dephash.
//!
//! # Available Commands
//!
//! - `gen` - Generate a pinned, hashed production requirements file from a
//!   development requirements file
//! - `outdated` - Fail when an environment or requirements file has newer
//!   releases available
//!
//! # Global Options
//!
//! - `-v, --verbose` / `-q, --quiet` - Log level (`debug` / `error`; default `info`)
//! - `-l, --log-file` - Append log records to a file instead of stderr
//! - `-c, --config` - Configuration file (also `DEPHASH_CONFIG`)
//!
//! Log records never go to stdout: `dephash gen requirements-dev.txt >
//! requirements-prod.txt` captures exactly the generated file.
//!
//! ```bash
//! dephash gen requirements-dev.txt > requirements-prod.txt
//! dephash -v gen -d deps/requirements-dev.txt
//! dephash gen -a sha256 --hasher builtin -o prod.txt requirements-dev.txt
//! dephash outdated .venv
//! ```

pub mod generate;
pub mod outdated;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::DephashConfig;

/// Process-wide settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Destination for log records; stderr when `None`.
    pub log_file: Option<PathBuf>,

    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over the level chosen by flags. Can only
    /// succeed once per process.
    pub fn init_logging(&self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

        let installed = match &self.log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file: {}", path.display()))?;
                builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
            }
            None => builder.with_writer(std::io::stderr).try_init(),
        };
        installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
    }
}

/// Pin and hash Python requirements.
#[derive(Parser, Debug)]
#[command(
    name = "dephash",
    about = "Generate pinned, hashed production requirements from a development requirements file",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output, including every external command and its output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Log errors only.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Append log records to this file instead of stderr.
    #[arg(short = 'l', long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Configuration file to use instead of the default location.
    #[arg(short, long, global = true, value_name = "PATH", env = "DEPHASH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a production requirements file with pinned versions and hashes.
    ///
    /// The development requirements are installed into a scratch
    /// environment, frozen, downloaded and hashed. Output goes to stdout
    /// unless -o or -d is given.
    Gen(generate::GenCommand),

    /// Exit with an error when packages have newer releases.
    ///
    /// PATH is either an existing environment directory or a requirements
    /// file to install into a scratch environment first.
    Outdated(outdated::OutdatedCommand),
}

impl Cli {
    /// Flags that affect the whole process rather than one command.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            log_file: self.log_file.clone(),
            config_path: self.config.clone(),
        }
    }

    /// Initialise logging, load configuration and run the selected command.
    pub async fn execute(self) -> Result<()> {
        let cli_config = self.build_config();
        cli_config.init_logging()?;
        self.execute_with_config(cli_config).await
    }

    /// Run the selected command without touching global logging state.
    pub async fn execute_with_config(self, cli_config: CliConfig) -> Result<()> {
        let config = DephashConfig::load_with_optional(cli_config.config_path).await?;
        tracing::debug!("Configuration: {:?}", config);

        match self.command {
            Commands::Gen(cmd) => cmd.execute(config).await,
            Commands::Outdated(cmd) => cmd.execute(config).await,
        }
    }
}
