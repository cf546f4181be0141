//! Configuration for dephash.
//!
//! Every setting has a built-in default (see [`crate::constants`]), may be
//! overridden by an optional TOML file, and finally by command-line flags.
//!
//! # File Location
//!
//! The file is looked up in this order:
//! 1. `--config <PATH>` (or the `DEPHASH_CONFIG` environment variable, which
//!    clap folds into the same flag)
//! 2. `{config_dir}/dephash/config.toml`, e.g. `~/.config/dephash/config.toml`
//!
//! A missing default file simply means "all defaults". A missing file that
//! was named explicitly is an error.
//!
//! # Format
//!
//! ```toml
//! virtualenv = "/usr/local/bin/virtualenv"
//! algorithm = "sha256"
//! hasher = "builtin"
//! isolated = true
//! installer = "pip"
//! artifact_pattern = '^{name}-{version}(\.tar\.gz|\.zip|-py[23]\..*\.whl)$'
//! scratch_dir = "/var/tmp"
//! header = "dephash"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    DEFAULT_ARTIFACT_PATTERN, DEFAULT_HEADER_NAME, DEFAULT_INSTALLER, DEFAULT_VIRTUALENV,
};
use crate::core::DephashError;
use crate::hashes::{HashAlgorithm, HasherKind};

/// Resolved dephash settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DephashConfig {
    /// Command used to create the isolated environment.
    pub virtualenv: String,

    /// Digest algorithm for the `--hash=` entries.
    pub algorithm: HashAlgorithm,

    /// Whether digests come from the installer's hash tool or are computed
    /// in-process.
    pub hasher: HasherKind,

    /// Pass `--isolated` to every installer invocation so user-level pip
    /// configuration cannot leak into the resolution.
    pub isolated: bool,

    /// Name of the installer package, as written in requirements files.
    pub installer: String,

    /// Artifact filename pattern with `{name}` and `{version}` placeholders.
    pub artifact_pattern: String,

    /// Parent directory for scratch directories; the system temp dir if unset.
    pub scratch_dir: Option<PathBuf>,

    /// Generator name written into the output header.
    pub header: String,
}

impl Default for DephashConfig {
    fn default() -> Self {
        Self {
            virtualenv: DEFAULT_VIRTUALENV.to_string(),
            algorithm: HashAlgorithm::default(),
            hasher: HasherKind::default(),
            isolated: true,
            installer: DEFAULT_INSTALLER.to_string(),
            artifact_pattern: DEFAULT_ARTIFACT_PATTERN.to_string(),
            scratch_dir: None,
            header: DEFAULT_HEADER_NAME.to_string(),
        }
    }
}

impl DephashConfig {
    /// Platform default location of the configuration file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dephash").join("config.toml"))
    }

    /// Load configuration from an explicit path, or from the default location.
    ///
    /// # Errors
    ///
    /// Returns [`DephashError::ConfigError`] if `path` is given but does not
    /// exist, and a parse error if any file that is read is not valid TOML
    /// for this schema.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(DephashError::ConfigError {
                    message: format!("configuration file {} does not exist", path.display()),
                }
                .into());
            }
            return Self::load_from(&path).await;
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path).await,
            _ => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Self::parse(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, DephashError> {
        Ok(toml::from_str(content)?)
    }
}
