//! Rendering of the pinned production requirements file.
//!
//! ```text
//! # Generated from dephash
//! python-dateutil==2.5.3 --hash=sha512:...
//! six==1.10.0 --hash=sha512:...
//! ```
//!
//! One header line, then one line per package in ascending name order, each
//! terminated by a single newline.

use crate::packages::PinnedTable;

/// Render `packages` as a production requirements file.
///
/// Pure: the same table always yields the same bytes.
#[must_use]
pub fn render(packages: &PinnedTable, generator: &str) -> String {
    let mut output = format!("# Generated from {generator}\n");
    for package in packages.iter() {
        output.push_str(&format!("{}=={} {}\n", package.name, package.version, package.hash));
    }
    output
}
