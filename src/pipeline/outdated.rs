//! Outdated-package check for an environment or a requirements file.

use anyhow::Result;
use std::path::Path;

use super::ScratchDir;
use crate::constants::COLUMNS_FORMAT_MIN_MAJOR;
use crate::core::DephashError;
use crate::freeze::{installer_major_version, parse_installer_version};
use crate::toolchain::Toolchain;

/// Fail with [`DephashError::OutdatedPackages`] when anything in `path` is
/// out of date.
///
/// A directory is taken to be an existing environment and queried in place;
/// it is never modified or removed. Anything else is treated as a
/// requirements file: it is installed into a scratch environment that is
/// removed afterwards.
pub async fn check_outdated<T: Toolchain>(
    toolchain: &T,
    path: &Path,
    scratch_parent: Option<&Path>,
) -> Result<()> {
    let listing = if path.is_dir() {
        tracing::debug!(target: "pipeline", "Using existing environment {}", path.display());
        query_outdated(toolchain, path).await?
    } else {
        let env = ScratchDir::create(scratch_parent, "venv")?;
        let result = install_and_query(toolchain, env.path(), path).await;
        let cleanup = env.close();
        let listing = result?;
        cleanup?;
        listing
    };

    if listing.trim().is_empty() {
        tracing::info!("All packages in {} are up to date", path.display());
        return Ok(());
    }

    tracing::error!("Outdated packages in {}:\n{}", path.display(), listing.trim_end());
    Err(DephashError::OutdatedPackages {
        listing,
    }
    .into())
}

async fn install_and_query<T: Toolchain>(
    toolchain: &T,
    env: &Path,
    requirements: &Path,
) -> Result<String> {
    toolchain.create_env(env).await?;
    tracing::info!("Installing {}", requirements.display());
    toolchain.install(env, requirements).await?;
    query_outdated(toolchain, env).await
}

async fn query_outdated<T: Toolchain>(toolchain: &T, env: &Path) -> Result<String> {
    let banner = toolchain.version(env).await?;
    let major = installer_major_version(&parse_installer_version(&banner)?)?;
    toolchain.list_outdated(env, major >= COLUMNS_FORMAT_MIN_MAJOR).await
}
