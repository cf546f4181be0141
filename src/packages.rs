//! Package tables flowing through the pinning pipeline.
//!
//! A run builds a [`PackageTable`] from the installer's freeze output (plus
//! the installer itself when it was pinned), and the hash matcher turns it
//! into a [`PinnedTable`] in which every entry carries a digest. Only a
//! `PinnedTable` can be rendered, so an unhashed package can never reach the
//! output file.
//!
//! Both tables are keyed by the logical package name exactly as the resolver
//! reported it, and iterate in ascending byte order of that name.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// A package whose version has been resolved but not yet hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Logical name, case preserved
    pub name: String,
    /// Resolved version, treated as an opaque token
    pub version: String,
}

/// Resolved packages keyed by logical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageTable {
    packages: BTreeMap<String, ResolvedPackage>,
}

impl PackageTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a package, returning the entry it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Option<ResolvedPackage> {
        let name = name.into();
        let package = ResolvedPackage {
            name: name.clone(),
            version: version.into(),
        };
        match self.packages.entry(name) {
            Entry::Occupied(mut occupied) => Some(occupied.insert(package)),
            Entry::Vacant(vacant) => {
                vacant.insert(package);
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedPackage> {
        self.packages.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedPackage> {
        self.packages.values()
    }
}

/// A package with both its version and its hash entry fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedPackage {
    pub name: String,
    pub version: String,
    /// Digest in pin syntax, e.g. `--hash=sha512:<hex>`
    pub hash: String,
}

/// Fully pinned packages keyed by logical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedTable {
    packages: BTreeMap<String, PinnedPackage>,
}

impl PinnedTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, package: PinnedPackage) {
        self.packages.insert(package.name.clone(), package);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PinnedPackage> {
        self.packages.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = &PinnedPackage> {
        self.packages.values()
    }
}
