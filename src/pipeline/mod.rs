//! The generation pipeline.
//!
//! A run moves through a fixed sequence of [`PipelineStage`]s:
//!
//! ```text
//! Start -> EnvCreated -> DepsInstalled -> VersionsResolved
//!       -> ArtifactsHashed -> Matched -> Rendered -> Done
//! ```
//!
//! Any step can fail, which moves the run to [`PipelineStage::Failed`] and
//! ends it. Each step awaits a single [`Toolchain`] call or a pure
//! transformation; nothing runs concurrently.
//!
//! Two scratch directories are created per run, one for the environment
//! and one for downloaded artifacts. Both are removed before [`Pipeline::run`]
//! returns, whatever the outcome.

pub mod outdated;
pub mod scratch;


pub use outdated::check_outdated;
pub use scratch::ScratchDir;

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::DephashConfig;
use crate::core::DephashError;
use crate::detect::InstallerPinDetector;
use crate::freeze::{parse_freeze, parse_installer_version};
use crate::hashes::{
    ArtifactHashTable, HashAlgorithm, HashMatcher, HasherKind, NamingPattern, build_hash_table,
    hash_artifacts, list_artifacts,
};
use crate::output::OutputSink;
use crate::render::render;
use crate::toolchain::Toolchain;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    EnvCreated,
    DepsInstalled,
    VersionsResolved,
    ArtifactsHashed,
    Matched,
    Rendered,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::EnvCreated => "env-created",
            Self::DepsInstalled => "deps-installed",
            Self::VersionsResolved => "versions-resolved",
            Self::ArtifactsHashed => "artifacts-hashed",
            Self::Matched => "matched",
            Self::Rendered => "rendered",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Number of pinned packages written.
    pub packages: usize,
    /// Whether the installer's own version was added to the pins.
    pub installer_pinned: bool,
    /// Final stage; always [`PipelineStage::Done`] for a returned report.
    pub stage: PipelineStage,
    /// Stages passed through, in order.
    pub stages: Vec<PipelineStage>,
    /// Where the output went.
    pub sink: String,
}

#[derive(Debug)]
struct StageTracker {
    stages: Vec<PipelineStage>,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stages: vec![PipelineStage::Start],
        }
    }

    fn current(&self) -> PipelineStage {
        self.stages.last().copied().unwrap_or(PipelineStage::Start)
    }

    fn advance(&mut self, next: PipelineStage) {
        tracing::debug!(target: "pipeline", "{} -> {}", self.current(), next);
        self.stages.push(next);
    }
}

/// Turns a development requirements file into pinned, hashed output.
#[derive(Debug)]
pub struct Pipeline<T> {
    toolchain: T,
    detector: InstallerPinDetector,
    matcher: HashMatcher,
    installer: String,
    algorithm: HashAlgorithm,
    hasher: HasherKind,
    scratch_parent: Option<PathBuf>,
    header: String,
}

impl<T: Toolchain> Pipeline<T> {
    /// Build a pipeline from configuration.
    ///
    /// The artifact pattern and installer name are validated here, before
    /// any run creates resources.
    pub fn new(toolchain: T, config: &DephashConfig) -> Result<Self, DephashError> {
        Ok(Self {
            toolchain,
            detector: InstallerPinDetector::new(&config.installer)?,
            matcher: HashMatcher::new(NamingPattern::new(config.artifact_pattern.clone())?),
            installer: config.installer.clone(),
            algorithm: config.algorithm,
            hasher: config.hasher,
            scratch_parent: config.scratch_dir.clone(),
            header: config.header.clone(),
        })
    }

    #[must_use]
    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Run the whole pipeline for `requirements` and write the result to
    /// `sink`.
    ///
    /// Returns the report and the rendered text. Nothing is written when any
    /// step fails, and the scratch directories are gone in both cases.
    pub async fn run(
        &self,
        requirements: &Path,
        sink: &OutputSink,
    ) -> Result<(PipelineReport, String)> {
        let contents = tokio::fs::read_to_string(requirements).await.with_context(|| {
            format!("Failed to read requirements file: {}", requirements.display())
        })?;
        let installer_pinned = self.detector.has_installer_pin(&contents);
        if installer_pinned {
            tracing::debug!(
                target: "pipeline",
                "{} pins {}; its version will be recorded",
                requirements.display(),
                self.installer
            );
        }

        let env = ScratchDir::create(self.scratch_parent.as_deref(), "venv")?;
        let downloads = ScratchDir::create(self.scratch_parent.as_deref(), "download")?;

        let mut tracker = StageTracker::new();
        let result = self
            .run_stages(
                requirements,
                installer_pinned,
                env.path(),
                downloads.path(),
                sink,
                &mut tracker,
            )
            .await;

        let cleanup = env.close().and(downloads.close());

        match result {
            Ok((packages, rendered)) => {
                cleanup?;
                tracker.advance(PipelineStage::Done);
                tracing::info!("Wrote {} pinned packages to {}", packages, sink);
                let report = PipelineReport {
                    packages,
                    installer_pinned,
                    stage: tracker.current(),
                    stages: tracker.stages,
                    sink: sink.to_string(),
                };
                Ok((report, rendered))
            }
            Err(err) => {
                tracing::debug!(
                    target: "pipeline",
                    "{} -> {}",
                    tracker.current(),
                    PipelineStage::Failed
                );
                if let Err(cleanup_err) = cleanup {
                    tracing::warn!("{:#}", cleanup_err);
                }
                Err(err)
            }
        }
    }

    async fn run_stages(
        &self,
        requirements: &Path,
        installer_pinned: bool,
        env: &Path,
        downloads: &Path,
        sink: &OutputSink,
        tracker: &mut StageTracker,
    ) -> Result<(usize, String)> {
        tracing::info!("Creating environment");
        self.toolchain.create_env(env).await?;
        tracker.advance(PipelineStage::EnvCreated);

        tracing::info!("Downloading artifacts for {}", requirements.display());
        self.toolchain.download(env, requirements, downloads).await?;
        tracing::info!("Installing {}", requirements.display());
        self.toolchain.install(env, requirements).await?;
        tracker.advance(PipelineStage::DepsInstalled);

        let frozen = self.toolchain.freeze(env).await?;
        let mut packages = parse_freeze(&frozen)?;
        if installer_pinned {
            let banner = self.toolchain.version(env).await?;
            let version = parse_installer_version(&banner)?;
            tracing::debug!(target: "pipeline", "Resolved {}=={}", self.installer, version);
            packages.insert(self.installer.clone(), version);
        }
        tracker.advance(PipelineStage::VersionsResolved);

        let hashes = self.hash_downloads(env, downloads).await?;
        tracker.advance(PipelineStage::ArtifactsHashed);

        let pinned = self.matcher.match_hashes(&packages, &hashes)?;
        tracker.advance(PipelineStage::Matched);

        let rendered = render(&pinned, &self.header);
        tracker.advance(PipelineStage::Rendered);

        sink.write(&rendered)?;
        Ok((pinned.len(), rendered))
    }

    async fn hash_downloads(&self, env: &Path, downloads: &Path) -> Result<ArtifactHashTable> {
        let artifacts = list_artifacts(downloads).with_context(|| {
            format!("Failed to list downloaded artifacts in {}", downloads.display())
        })?;
        tracing::debug!(target: "pipeline", "Hashing {} artifacts", artifacts.len());

        if artifacts.is_empty() {
            return Ok(ArtifactHashTable::new());
        }

        let table = match self.hasher {
            HasherKind::Pip => {
                let output =
                    self.toolchain.hash(env, self.algorithm, downloads, &artifacts).await?;
                build_hash_table(&output)?
            }
            HasherKind::Builtin => hash_artifacts(downloads, &artifacts, self.algorithm)?,
        };
        Ok(table)
    }
}
