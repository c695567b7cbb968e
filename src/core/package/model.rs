use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What the installer found in the downloaded payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PackageKind {
    /// A zip archive, extracted into the install root.
    Extracted,
    /// A standalone `.html` page; front ends render it instead of launching.
    Document { path: PathBuf },
    /// Any other single file, kept as downloaded.
    Artifact { path: PathBuf },
}

/// A library entry under `applications/<name>/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub install_root: PathBuf,
    #[serde(flatten)]
    pub kind: PackageKind,
}

impl InstalledPackage {
    pub fn is_document(&self) -> bool {
        matches!(self.kind, PackageKind::Document { .. })
    }
}

/// A launchable file found inside an installed package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutableCandidate {
    pub display_name: String,
    pub absolute_path: PathBuf,
}
