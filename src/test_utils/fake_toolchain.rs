//! Scripted [`Toolchain`] for tests.

use anyhow::Result;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::core::DephashError;
use crate::hashes::{HashAlgorithm, hash_file};
use crate::toolchain::Toolchain;

/// One toolchain operation, used to script failures and inspect call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeStep {
    CreateEnv,
    Install,
    Freeze,
    Version,
    Download,
    Hash,
    ListOutdated,
}

/// In-memory toolchain.
///
/// `download` writes every configured artifact into the destination (the
/// file content is the file name), and `hash` computes real digests of the
/// files it is given, so output from the pip and built-in hashers agrees.
#[derive(Debug, Default)]
pub struct FakeToolchain {
    freeze_output: String,
    version_output: String,
    outdated_output: String,
    artifacts: Vec<String>,
    failing: Option<FakeStep>,
    calls: Mutex<Vec<FakeStep>>,
}

impl FakeToolchain {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version_output: "pip 9.0.1 from /fake/site-packages (python 3.6)\n".to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_freeze(mut self, output: impl Into<String>) -> Self {
        self.freeze_output = output.into();
        self
    }

    #[must_use]
    pub fn with_version(mut self, output: impl Into<String>) -> Self {
        self.version_output = output.into();
        self
    }

    #[must_use]
    pub fn with_outdated(mut self, output: impl Into<String>) -> Self {
        self.outdated_output = output.into();
        self
    }

    #[must_use]
    pub fn with_artifact(mut self, filename: impl Into<String>) -> Self {
        self.artifacts.push(filename.into());
        self
    }

    #[must_use]
    pub fn failing_at(mut self, step: FakeStep) -> Self {
        self.failing = Some(step);
        self
    }

    /// Operations performed so far, in order.
    pub fn calls(&self) -> Vec<FakeStep> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, step: FakeStep) -> Result<()> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(step);
        if self.failing == Some(step) {
            return Err(DephashError::CommandFailed {
                command: format!("fake {step:?}"),
                exit_code: Some(1),
                output: String::new(),
            }
            .into());
        }
        Ok(())
    }
}

impl Toolchain for FakeToolchain {
    async fn create_env(&self, target: &Path) -> Result<()> {
        self.record(FakeStep::CreateEnv)?;
        tokio::fs::create_dir_all(target.join("bin")).await?;
        Ok(())
    }

    async fn install(&self, _env: &Path, _requirements: &Path) -> Result<()> {
        self.record(FakeStep::Install)
    }

    async fn freeze(&self, _env: &Path) -> Result<String> {
        self.record(FakeStep::Freeze)?;
        Ok(self.freeze_output.clone())
    }

    async fn version(&self, _env: &Path) -> Result<String> {
        self.record(FakeStep::Version)?;
        Ok(self.version_output.clone())
    }

    async fn download(&self, _env: &Path, _requirements: &Path, dest: &Path) -> Result<()> {
        self.record(FakeStep::Download)?;
        for filename in &self.artifacts {
            tokio::fs::write(dest.join(filename), filename.as_bytes()).await?;
        }
        Ok(())
    }

    async fn hash(
        &self,
        _env: &Path,
        algorithm: HashAlgorithm,
        dir: &Path,
        files: &[String],
    ) -> Result<String> {
        self.record(FakeStep::Hash)?;
        if files.is_empty() {
            anyhow::bail!("hash called without files");
        }
        let mut output = String::new();
        for filename in files {
            let digest = hash_file(&dir.join(filename), algorithm)?;
            output.push_str(&format!("{filename}:\n{digest}\n"));
        }
        Ok(output)
    }

    async fn list_outdated(&self, _env: &Path, _columns: bool) -> Result<String> {
        self.record(FakeStep::ListOutdated)?;
        Ok(self.outdated_output.clone())
    }
}
