//! Parsing of installer output: `freeze` listings and `--version` banners.

use crate::core::DephashError;
use crate::packages::PackageTable;

/// Parse frozen output (`name==version` per line) into a [`PackageTable`].
///
/// Blank lines are ignored. Any other line must contain exactly one `==`
/// with a non-empty name and version on either side, otherwise the whole
/// parse fails with [`DephashError::MalformedFreezeLine`].
///
/// When a name appears twice the later line wins.
///
/// # Examples
///
/// ```rust
/// use dephash::freeze::parse_freeze;
///
/// let table = parse_freeze("a==1\nb==2").unwrap();
/// assert_eq!(table.get("a").unwrap().version, "1");
/// assert_eq!(table.get("b").unwrap().version, "2");
/// ```
pub fn parse_freeze(output: &str) -> Result<PackageTable, DephashError> {
    let mut table = PackageTable::new();

    for (index, raw_line) in output.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let malformed = || DephashError::MalformedFreezeLine {
            line_number: index + 1,
            line: raw_line.to_string(),
        };

        let mut parts = line.split("==");
        let (Some(name), Some(version), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        if name.is_empty() || version.is_empty() {
            return Err(malformed());
        }

        if let Some(previous) = table.insert(name, version) {
            tracing::debug!(
                "Duplicate freeze entry for {}: {} replaced by {}",
                name,
                previous.version,
                version
            );
        }
    }

    Ok(table)
}

/// Extract the version from the installer's `--version` banner.
///
/// `pip 9.0.1 from /venv/lib/python3.6/site-packages (python 3.6)` yields
/// `9.0.1`: the second whitespace-separated token.
pub fn parse_installer_version(output: &str) -> Result<String, DephashError> {
    output.split_whitespace().nth(1).map(str::to_string).ok_or_else(|| {
        DephashError::MalformedVersionOutput {
            output: output.trim().to_string(),
        }
    })
}

/// Leading numeric component of a version (`10.0.0b1` -> `10`).
pub fn installer_major_version(version: &str) -> Result<u64, DephashError> {
    let digits: String = version.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().map_err(|_| DephashError::MalformedVersionOutput {
        output: version.to_string(),
    })
}
