//! Filesystem data types shared across the store contract and its consumers.

use serde::{Deserialize, Serialize};

/// File-name suffix marking a shortcut entry.
pub const SHORTCUT_SUFFIX: &str = ".shortcut";
/// Extension (without dot) used when creating shortcut entries.
pub const SHORTCUT_EXTENSION: &str = "shortcut";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Entry node kind.
pub enum FsEntryKind {
    /// Regular file.
    File,
    /// Directory.
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Named file or folder inside the sandbox.
pub struct FsEntry {
    /// Base name of the entry.
    pub name: String,
    /// Normalized virtual path (`/` is the sandbox root).
    pub path: String,
    /// File or folder kind.
    #[serde(rename = "type")]
    pub kind: FsEntryKind,
}

impl FsEntry {
    /// Creates an entry record.
    pub fn new(name: impl Into<String>, path: impl Into<String>, kind: FsEntryKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
        }
    }

    /// Returns `true` for folder entries.
    pub fn is_folder(&self) -> bool {
        self.kind == FsEntryKind::Folder
    }

    /// Returns `true` when the entry name carries the shortcut suffix.
    pub fn is_shortcut(&self) -> bool {
        self.name.ends_with(SHORTCUT_SUFFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Detailed properties for a single path.
pub struct FsItemProperties {
    /// Base name (`/` for the root).
    pub name: String,
    /// Normalized virtual path.
    pub path: String,
    /// File or folder kind.
    #[serde(rename = "type")]
    pub kind: FsEntryKind,
    /// Size in bytes (zero for folders).
    pub size: u64,
    /// Creation time in unix milliseconds when the platform reports it.
    pub created_at_unix_ms: Option<u64>,
    /// Last-modified time in unix milliseconds when available.
    pub modified_at_unix_ms: Option<u64>,
}

impl FsItemProperties {
    /// Returns the lightweight entry view of these properties.
    pub fn to_entry(&self) -> FsEntry {
        FsEntry::new(self.name.clone(), self.path.clone(), self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload of a `.shortcut` entry.
pub struct ShortcutMetadata {
    /// Virtual path the shortcut points at.
    pub target_path: String,
}
