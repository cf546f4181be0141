//! Artifact hashes and their matching to resolved packages.
//!
//! The installer downloads one artifact per package (a source archive or a
//! wheel) and its hash tool prints, for each file:
//!
//! ```text
//! python_dateutil-2.5.3.tar.gz:
//! --hash=sha512:9c2b9d...
//! ```
//!
//! [`build_hash_table`] turns that output into an [`ArtifactHashTable`]
//! keyed by filename. [`HashMatcher`] then finds, for every resolved
//! package, the artifact whose filename fits the configured
//! [`NamingPattern`] for that name and version.
//!
//! # Name normalization
//!
//! Logical names and distribution filenames disagree on separators:
//! `python-dateutil` ships as `python_dateutil-2.5.3.tar.gz`. The name part
//! of the pattern therefore accepts `-` and `_` interchangeably at every
//! separator position.
//!
//! # Determinism
//!
//! The table is ordered by filename, and the matcher takes the first
//! matching filename in that order, so the same inputs always produce the
//! same pins.

mod builtin;

pub use builtin::{hash_artifacts, hash_file};

use clap::ValueEnum;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::core::DephashError;
use crate::packages::{PackageTable, PinnedPackage, PinnedTable, ResolvedPackage};

/// Digest algorithms accepted in `--hash=` pins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    #[default]
    Sha512,
}

impl HashAlgorithm {
    /// Name as spelled in pins and on the hash tool's command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where artifact digests come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    /// The installer's own hash tool (`pip hash`)
    #[default]
    Pip,
    /// Computed in-process
    Builtin,
}

/// Digest entries keyed by artifact filename, ordered by filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactHashTable {
    entries: BTreeMap<String, String>,
}

impl ArtifactHashTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, digest: impl Into<String>) {
        self.entries.insert(filename.into(), digest.into());
    }

    #[must_use]
    pub fn get(&self, filename: &str) -> Option<&str> {
        self.entries.get(filename).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(filename, digest)` pairs in ascending filename order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse the hash tool's output into an [`ArtifactHashTable`].
///
/// Non-blank lines must alternate between a filename terminated by `:` and
/// a `--hash=` digest line; surrounding whitespace is ignored. An odd number
/// of lines is rejected instead of silently dropping the last one.
///
/// ```rust
/// use dephash::hashes::build_hash_table;
///
/// let table = build_hash_table("foo-1.0.tar.gz:\n  --hash=sha512:deadbeef\n").unwrap();
/// assert_eq!(table.get("foo-1.0.tar.gz"), Some("--hash=sha512:deadbeef"));
/// ```
pub fn build_hash_table(output: &str) -> Result<ArtifactHashTable, DephashError> {
    let lines: Vec<&str> = output.lines().map(str::trim).filter(|line| !line.is_empty()).collect();

    if lines.len() % 2 != 0 {
        return Err(DephashError::MalformedHashOutput {
            reason: format!(
                "expected filename/digest line pairs, got {} lines (last: '{}')",
                lines.len(),
                lines.last().copied().unwrap_or_default()
            ),
        });
    }

    let mut table = ArtifactHashTable::new();
    for pair in lines.chunks_exact(2) {
        let &[filename_line, digest] = pair else {
            continue;
        };

        let filename = filename_line.strip_suffix(':').filter(|name| !name.is_empty()).ok_or_else(
            || DephashError::MalformedHashOutput {
                reason: format!("expected a filename ending in ':', got '{filename_line}'"),
            },
        )?;
        if !digest.starts_with("--hash=") {
            return Err(DephashError::MalformedHashOutput {
                reason: format!("expected a '--hash=' line after '{filename_line}', got '{digest}'"),
            });
        }

        table.insert(filename, digest);
    }

    Ok(table)
}

/// Regular files in `dir`, by name, sorted.
pub fn list_artifacts(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Artifact filename template with `{name}` and `{version}` placeholders.
///
/// The template is a regular expression. Placeholders are replaced with the
/// regex-escaped package name and version; in the name every `-` or `_`
/// becomes `[-_]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPattern {
    template: String,
}

impl NamingPattern {
    /// Validate and wrap a template.
    pub fn new(template: impl Into<String>) -> Result<Self, DephashError> {
        let template = template.into();
        for placeholder in ["{name}", "{version}"] {
            if !template.contains(placeholder) {
                return Err(DephashError::InvalidPattern {
                    pattern: template,
                    reason: format!("missing {placeholder} placeholder"),
                });
            }
        }
        Ok(Self {
            template,
        })
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Build the filename regex for one package.
    pub fn compile(&self, name: &str, version: &str) -> Result<Regex, DephashError> {
        let name_pattern =
            name.split(['-', '_']).map(regex::escape).collect::<Vec<_>>().join("[-_]");
        let source = self
            .template
            .replace("{name}", &name_pattern)
            .replace("{version}", &regex::escape(version));

        Regex::new(&source).map_err(|e| DephashError::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })
    }
}

/// Joins resolved packages with artifact digests.
#[derive(Debug, Clone)]
pub struct HashMatcher {
    pattern: NamingPattern,
}

impl HashMatcher {
    #[must_use]
    pub const fn new(pattern: NamingPattern) -> Self {
        Self {
            pattern,
        }
    }

    /// First `(filename, digest)` in filename order that fits `package`.
    pub fn find<'a>(
        &self,
        package: &ResolvedPackage,
        hashes: &'a ArtifactHashTable,
    ) -> Result<Option<(&'a str, &'a str)>, DephashError> {
        let regex = self.pattern.compile(&package.name, &package.version)?;
        Ok(hashes.iter().find(|(filename, _)| regex.is_match(filename)))
    }

    /// Attach a digest to every package.
    ///
    /// Every package is checked before failing: if any of them has no
    /// matching artifact the result is a single
    /// [`DephashError::MissingHashes`] naming all of them.
    pub fn match_hashes(
        &self,
        packages: &PackageTable,
        hashes: &ArtifactHashTable,
    ) -> Result<PinnedTable, DephashError> {
        let mut pinned = PinnedTable::new();
        let mut missing = Vec::new();

        for package in packages.iter() {
            match self.find(package, hashes)? {
                Some((filename, digest)) => {
                    tracing::debug!("{}=={} -> {}", package.name, package.version, filename);
                    pinned.insert(PinnedPackage {
                        name: package.name.clone(),
                        version: package.version.clone(),
                        hash: digest.to_string(),
                    });
                }
                None => {
                    tracing::warn!("Missing hash for {}=={}", package.name, package.version);
                    missing.push(package.name.clone());
                }
            }
        }

        if !missing.is_empty() {
            return Err(DephashError::MissingHashes {
                names: missing,
            });
        }
        Ok(pinned)
    }
}
