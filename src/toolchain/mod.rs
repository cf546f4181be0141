//! External collaborators: environment creation and the package installer.
//!
//! The pipeline never spawns processes itself; it talks to a [`Toolchain`].
//! [`PipToolchain`] is the real implementation, driving `virtualenv` and the
//! environment's own `pip` through [`ToolCommand`]. Tests substitute a
//! scripted toolchain.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::DephashConfig;
use crate::hashes::HashAlgorithm;
use crate::process::ToolCommand;

/// Operations dephash needs from the outside world.
///
/// Every method is a single external invocation. `env` is always a directory
/// previously passed to [`create_env`](Toolchain::create_env), or an existing
/// environment supplied by the user.
#[allow(async_fn_in_trait)]
pub trait Toolchain {
    /// Materialise an isolated environment in `target`.
    async fn create_env(&self, target: &Path) -> Result<()>;

    /// Install a requirements file into `env`.
    async fn install(&self, env: &Path, requirements: &Path) -> Result<()>;

    /// Frozen `name==version` listing of `env`.
    async fn freeze(&self, env: &Path) -> Result<String>;

    /// The installer's `--version` banner.
    async fn version(&self, env: &Path) -> Result<String>;

    /// Download the artifacts for a requirements file into `dest`.
    async fn download(&self, env: &Path, requirements: &Path, dest: &Path) -> Result<()>;

    /// Hash tool output for `files`, which are names relative to `dir`.
    async fn hash(
        &self,
        env: &Path,
        algorithm: HashAlgorithm,
        dir: &Path,
        files: &[String],
    ) -> Result<String>;

    /// Listing of outdated packages in `env`; empty when everything is current.
    async fn list_outdated(&self, env: &Path, columns: bool) -> Result<String>;
}

/// `virtualenv` + `pip`.
#[derive(Debug, Clone)]
pub struct PipToolchain {
    virtualenv: String,
    isolated: bool,
}

impl PipToolchain {
    #[must_use]
    pub fn new(virtualenv: impl Into<String>, isolated: bool) -> Self {
        Self {
            virtualenv: virtualenv.into(),
            isolated,
        }
    }

    #[must_use]
    pub fn from_config(config: &DephashConfig) -> Self {
        Self::new(config.virtualenv.clone(), config.isolated)
    }

    /// Path of the `pip` executable inside `env`.
    #[must_use]
    pub fn pip_path(env: &Path) -> PathBuf {
        if cfg!(windows) {
            env.join("Scripts").join("pip.exe")
        } else {
            env.join("bin").join("pip")
        }
    }

    fn pip(&self, env: &Path) -> ToolCommand {
        let cmd = ToolCommand::new(Self::pip_path(env).display().to_string());
        if self.isolated {
            cmd.arg("--isolated")
        } else {
            cmd
        }
    }
}

impl Toolchain for PipToolchain {
    async fn create_env(&self, target: &Path) -> Result<()> {
        ToolCommand::new(&self.virtualenv)
            .arg(target.display().to_string())
            .with_context("virtualenv")
            .execute_checked()
            .await
    }

    async fn install(&self, env: &Path, requirements: &Path) -> Result<()> {
        self.pip(env)
            .args(["install", "-r"])
            .arg(requirements.display().to_string())
            .with_context("install")
            .execute_checked()
            .await
    }

    async fn freeze(&self, env: &Path) -> Result<String> {
        self.pip(env).arg("freeze").with_context("freeze").execute_stdout().await
    }

    async fn version(&self, env: &Path) -> Result<String> {
        self.pip(env).arg("--version").with_context("version").execute_stdout().await
    }

    async fn download(&self, env: &Path, requirements: &Path, dest: &Path) -> Result<()> {
        self.pip(env)
            .args(["download", "-r"])
            .arg(requirements.display().to_string())
            .arg("-d")
            .arg(dest.display().to_string())
            .with_context("download")
            .execute_checked()
            .await
    }

    async fn hash(
        &self,
        env: &Path,
        algorithm: HashAlgorithm,
        dir: &Path,
        files: &[String],
    ) -> Result<String> {
        self.pip(env)
            .args(["hash", "-a", algorithm.as_str()])
            .args(files.iter().cloned())
            .current_dir(dir)
            .with_context("hash")
            .execute_stdout()
            .await
    }

    async fn list_outdated(&self, env: &Path, columns: bool) -> Result<String> {
        let mut cmd = self.pip(env).args(["list", "--outdated"]);
        if columns {
            cmd = cmd.arg("--format=columns");
        }
        cmd.with_context("outdated").execute_stdout().await
    }
}
