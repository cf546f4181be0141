//! Destinations for the rendered production file.

use anyhow::Result;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::{DEV_MARKER, FALLBACK_OUTPUT_NAME, PROD_MARKER};
use crate::utils::atomic_write;

/// Where a finished run writes its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// Standard output
    Stdout,
    /// A file, replaced atomically
    File(PathBuf),
}

impl OutputSink {
    /// Write the complete rendered text.
    pub fn write(&self, content: &str) -> Result<()> {
        match self {
            Self::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                stdout.flush()?;
            }
            Self::File(path) => {
                tracing::debug!("Writing to {}", path.display());
                atomic_write(path, content.as_bytes())?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Default production path for a development requirements path.
///
/// `-dev` in the file name becomes `-prod`; a name without `-dev` maps to
/// `reqhash.out`. The directory is kept either way, and a `-dev` in a
/// directory name is left alone.
///
/// ```rust
/// use dephash::output::derive_prod_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     derive_prod_path(Path::new("deps/requirements-dev.txt")),
///     PathBuf::from("deps/requirements-prod.txt")
/// );
/// ```
#[must_use]
pub fn derive_prod_path(dev_path: &Path) -> PathBuf {
    let parent = dev_path.parent().unwrap_or_else(|| Path::new(""));
    let dev_name = dev_path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();

    let prod_name = if dev_name.contains(DEV_MARKER) {
        dev_name.replace(DEV_MARKER, PROD_MARKER)
    } else {
        FALLBACK_OUTPUT_NAME.to_string()
    };
    parent.join(prod_name)
}
