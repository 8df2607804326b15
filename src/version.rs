//! Staleness decisions between installed mods and catalog entries.
//!
//! Identity strings follow the `<owner>-<name>-<version>` convention used
//! by the remote catalog. Two descriptors refer to the same logical
//! package iff their owner+name prefixes match exactly; any difference in
//! the full identity of a matched pair means the local install is
//! outdated. No semantic version parsing happens here.

use serde::{Deserialize, Serialize};

/// Remote catalog metadata for one package. Refetched per session and
/// cached in memory only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub owner: String,
    /// Full identity string of the latest published version.
    pub latest_identity: String,
}

/// Locally detected mod metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledModDescriptor {
    pub name: String,
    /// Identity string recorded by the package-manager layer, if the mod
    /// was installed through it.
    pub identity: Option<String>,
}

/// Strips an identity string down to its owner+name prefix, e.g.
/// "taskinoz-WallrunningTitans-1.0.0" -> "taskinoz-WallrunningTitans".
/// Everything after the second segment is the version and is discarded as
/// a unit, even when it contains hyphens itself. Returns `None` for
/// strings with fewer than two segments.
pub fn dependency_prefix(identity: &str) -> Option<String> {
    let mut segments = identity.splitn(3, '-');
    let owner = segments.next()?;
    let name = segments.next()?;
    Some(format!("{}-{}", owner, name))
}

/// Whether a local install of the package identified by
/// `catalog_latest_identity` exists and differs from it.
///
/// No local match means "not installed", which is not outdated. Duplicate
/// installs sharing one prefix should not happen; if they do, the first
/// in iteration order wins.
pub fn is_outdated(catalog_latest_identity: &str, installed: &[InstalledModDescriptor]) -> bool {
    let Some(catalog_prefix) = dependency_prefix(catalog_latest_identity) else {
        return false;
    };

    let matching = installed.iter().find(|m| {
        m.identity
            .as_deref()
            .and_then(dependency_prefix)
            .is_some_and(|prefix| prefix == catalog_prefix)
    });

    match matching {
        Some(local) => local.identity.as_deref() != Some(catalog_latest_identity),
        None => false,
    }
}

impl CatalogEntry {
    pub fn is_outdated_against(&self, installed: &[InstalledModDescriptor]) -> bool {
        is_outdated(&self.latest_identity, installed)
    }
}
