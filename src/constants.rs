//! Default values used throughout dephash.
//!
//! These are the fallbacks behind every configuration key; the values that
//! actually reach the matcher and detector come from
//! [`DephashConfig`](crate::config::DephashConfig).

/// Name written into the header comment of generated files.
pub const DEFAULT_HEADER_NAME: &str = "dephash";

/// The installer package. It never appears in its own freeze output.
pub const DEFAULT_INSTALLER: &str = "pip";

/// Environment-creation command.
pub const DEFAULT_VIRTUALENV: &str = "virtualenv";

/// Artifact filename pattern. `{name}` and `{version}` are substituted with
/// escaped values; `{name}` additionally accepts `-` and `_` interchangeably.
pub const DEFAULT_ARTIFACT_PATTERN: &str = r"^{name}-{version}(\.tar\.gz|-py[23]\..*\.whl)$";

/// Output filename used when the input name carries no `-dev` marker.
pub const FALLBACK_OUTPUT_NAME: &str = "reqhash.out";

/// Marker replaced in the input filename when deriving the output filename.
pub const DEV_MARKER: &str = "-dev";

/// Replacement for [`DEV_MARKER`].
pub const PROD_MARKER: &str = "-prod";

/// Prefix of every scratch directory dephash creates.
pub const SCRATCH_PREFIX: &str = "dephash-";

/// Installer major version from which `list --outdated` needs an explicit
/// `--format=columns` to keep the tabular layout.
pub const COLUMNS_FORMAT_MIN_MAJOR: u64 = 9;
