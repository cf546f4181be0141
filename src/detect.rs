//! Detect whether a requirements file pins the installer itself.
//!
//! The installer (`pip`) manages every other package but is left out of its
//! own `freeze` listing, so when a development requirements file pins it, its
//! version has to be queried separately.

use regex::Regex;

use crate::core::DephashError;

/// Line matcher for an explicit installer pin.
///
/// A line matches when it starts with the installer name (case-sensitive),
/// optionally followed by a version comparator and number, and then either
/// ends (optionally with a `\` continuation) or continues with `--hash`.
/// `pip==9.0.1`, `pip>=8 \` and `pip==9.0.1 --hash=sha512:...` match;
/// `pip-tools==1.9.0`, `pipenv` and `# pip` do not.
#[derive(Debug, Clone)]
pub struct InstallerPinDetector {
    pattern: Regex,
}

impl InstallerPinDetector {
    /// Build a detector for the named installer package.
    pub fn new(installer: &str) -> Result<Self, DephashError> {
        let source = format!(r"^{}[ >=<\d.]*(\\?$| *--hash)", regex::escape(installer));
        let pattern = Regex::new(&source).map_err(|e| DephashError::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern,
        })
    }

    /// Whether any line of `contents` pins the installer.
    #[must_use]
    pub fn has_installer_pin(&self, contents: &str) -> bool {
        contents.lines().any(|line| self.pattern.is_match(line))
    }
}
