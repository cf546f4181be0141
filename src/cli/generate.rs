//! The `gen` command: development requirements in, pinned and hashed
//! production requirements out.
//!
//! ```bash
//! # To stdout
//! dephash gen requirements-dev.txt
//!
//! # To requirements-prod.txt next to the input
//! dephash gen -d requirements-dev.txt
//!
//! # To an explicit file, with sha256 digests computed in-process
//! dephash gen -o prod.txt -a sha256 --hasher builtin requirements-dev.txt
//! ```

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::DephashConfig;
use crate::hashes::{HashAlgorithm, HasherKind};
use crate::output::{OutputSink, derive_prod_path};
use crate::pipeline::Pipeline;
use crate::toolchain::PipToolchain;

/// Arguments of `dephash gen`.
#[derive(Args, Debug)]
pub struct GenCommand {
    /// Environment-creation command (defaults to `virtualenv`).
    #[arg(long, value_name = "CMD")]
    virtualenv: Option<String>,

    /// Write the result to PATH instead of stdout.
    #[arg(short, long, value_name = "PATH", conflicts_with = "derive_output")]
    output_file: Option<PathBuf>,

    /// Write the result next to the input, replacing `-dev` with `-prod` in
    /// the file name (or to `reqhash.out` when there is no `-dev`).
    #[arg(short, long)]
    derive_output: bool,

    /// Digest algorithm for the `--hash` entries.
    #[arg(short, long, value_enum)]
    algorithm: Option<HashAlgorithm>,

    /// Where digests come from.
    #[arg(long, value_enum)]
    hasher: Option<HasherKind>,

    /// Development requirements file.
    requirements_dev: PathBuf,
}

impl GenCommand {
    /// Where the rendered file goes.
    #[must_use]
    pub fn sink(&self) -> OutputSink {
        if let Some(path) = &self.output_file {
            OutputSink::File(path.clone())
        } else if self.derive_output {
            OutputSink::File(derive_prod_path(&self.requirements_dev))
        } else {
            OutputSink::Stdout
        }
    }

    /// Apply command-line overrides on top of the loaded configuration.
    fn apply_overrides(&self, mut config: DephashConfig) -> DephashConfig {
        if let Some(virtualenv) = &self.virtualenv {
            config.virtualenv.clone_from(virtualenv);
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(hasher) = self.hasher {
            config.hasher = hasher;
        }
        config
    }

    pub async fn execute(self, config: DephashConfig) -> Result<()> {
        let config = self.apply_overrides(config);
        let sink = self.sink();
        tracing::debug!(
            "Generating from {} to {} ({}, {:?} hasher)",
            self.requirements_dev.display(),
            sink,
            config.algorithm,
            config.hasher
        );

        let pipeline = Pipeline::new(PipToolchain::from_config(&config), &config)?;
        pipeline.run(&self.requirements_dev, &sink).await?;
        Ok(())
    }
}
