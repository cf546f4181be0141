//! In-process artifact hashing.
//!
//! Produces the same `--hash=<algorithm>:<hex>` entries as the installer's
//! hash tool without spawning it.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fs;
use std::path::Path;

use super::{ArtifactHashTable, HashAlgorithm};

/// Hash one file and format the digest as a pin entry.
///
/// # Examples
///
/// ```rust,no_run
/// use dephash::hashes::{HashAlgorithm, hash_file};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let entry = hash_file(Path::new("six-1.10.0.tar.gz"), HashAlgorithm::Sha256)?;
/// assert!(entry.starts_with("--hash=sha256:"));
/// # Ok(())
/// # }
/// ```
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let content = fs::read(path)
        .with_context(|| format!("Cannot read artifact for hashing: {}", path.display()))?;

    let digest = match algorithm {
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(&content)),
        HashAlgorithm::Sha384 => hex::encode(Sha384::digest(&content)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(&content)),
    };

    Ok(format!("--hash={}:{}", algorithm.as_str(), digest))
}

/// Hash every named file in `dir`.
pub fn hash_artifacts(
    dir: &Path,
    filenames: &[String],
    algorithm: HashAlgorithm,
) -> Result<ArtifactHashTable> {
    let mut table = ArtifactHashTable::new();
    for filename in filenames {
        table.insert(filename.clone(), hash_file(&dir.join(filename), algorithm)?);
    }
    Ok(table)
}
