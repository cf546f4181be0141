//! The `outdated` command.
//!
//! ```bash
//! # An existing environment, queried in place
//! dephash outdated .venv
//!
//! # A requirements file, installed into a scratch environment first
//! dephash outdated requirements-prod.txt
//! ```
//!
//! Exits 1 and prints the installer's listing when anything is outdated.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::DephashConfig;
use crate::core::DephashError;
use crate::pipeline::check_outdated;
use crate::toolchain::PipToolchain;

/// Arguments of `dephash outdated`.
#[derive(Args, Debug)]
pub struct OutdatedCommand {
    /// Environment-creation command (defaults to `virtualenv`).
    #[arg(long, value_name = "CMD")]
    virtualenv: Option<String>,

    /// Environment directory or requirements file.
    path: PathBuf,
}

impl OutdatedCommand {
    pub async fn execute(self, mut config: DephashConfig) -> Result<()> {
        if !self.path.exists() {
            return Err(DephashError::FileSystemError {
                operation: "find".to_string(),
                path: self.path.display().to_string(),
            }
            .into());
        }
        if let Some(virtualenv) = self.virtualenv {
            config.virtualenv = virtualenv;
        }

        let toolchain = PipToolchain::from_config(&config);
        check_outdated(&toolchain, &self.path, config.scratch_dir.as_deref()).await
    }
}
