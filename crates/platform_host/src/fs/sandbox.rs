//! Scoped native file store rooted at a canonical sandbox directory.
//!
//! Paths are resolved lexically first (a `..` that climbs above `/` is rejected outright), then
//! physically: existing nodes are canonicalized and must stay under the canonical root, and nodes
//! about to be created must have a canonical parent under the root. Together these defeat both
//! relative-segment escapes and symlinks that point outside the sandbox.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::{debug, warn};

use super::{
    error::FsError,
    path::{
        is_valid_leaf_name, join_virtual_path, normalize_virtual_path, parent_virtual_path,
        split_file_name, unique_child_name, virtual_leaf_name,
    },
    service::{FileStoreFuture, FileStoreService},
    types::{FsEntry, FsEntryKind, FsItemProperties, ShortcutMetadata, SHORTCUT_EXTENSION},
};

fn unix_ms(time: io::Result<SystemTime>) -> Option<u64> {
    time.ok()
        .and_then(|value| value.duration_since(UNIX_EPOCH).ok())
        .map(|value| value.as_millis() as u64)
}

fn entry_kind(metadata: &fs::Metadata) -> FsEntryKind {
    if metadata.is_dir() {
        FsEntryKind::Folder
    } else {
        FsEntryKind::File
    }
}

fn logged<T>(operation: &'static str, result: Result<T, FsError>) -> Result<T, FsError> {
    if let Err(err) = &result {
        warn!(
            operation,
            path = err.path(),
            kind = ?err.kind(),
            "file store operation failed: {err}"
        );
    }
    result
}

fn copy_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(src)?;
    if !metadata.is_dir() {
        fs::copy(src, dst)?;
        return Ok(());
    }

    fs::create_dir(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_symlink() {
            warn!(path = %entry.path().display(), "skipping symlink during copy");
            continue;
        }
        copy_recursive(&entry.path(), &dst.join(entry.file_name()))?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
/// File store jailed to a canonical native directory.
pub struct SandboxedFileStore {
    root: PathBuf,
}

impl SandboxedFileStore {
    /// Creates a store rooted at `root`.
    ///
    /// The directory is created if needed and canonicalized before use.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, FsError> {
        let root = root.as_ref();
        let display = root.display().to_string();
        fs::create_dir_all(root).map_err(|err| FsError::from_io(display.as_str(), &err))?;
        let root = fs::canonicalize(root).map_err(|err| FsError::from_io(display, &err))?;
        debug!(root = %root.display(), "sandboxed file store ready");
        Ok(Self { root })
    }

    /// Canonical native sandbox root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a virtual path to its native location without touching storage.
    ///
    /// The returned path is always prefixed by [`Self::root`].
    pub fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        self.resolve_virtual_path(path).map(|(_, native)| native)
    }

    fn resolve_virtual_path(&self, path: &str) -> Result<(String, PathBuf), FsError> {
        let normalized = normalize_virtual_path(path).ok_or_else(|| FsError::security(path))?;
        let mut native = self.root.clone();
        for segment in normalized.split('/').filter(|segment| !segment.is_empty()) {
            native.push(segment);
        }
        if !native.starts_with(&self.root) {
            return Err(FsError::security(path));
        }
        Ok((normalized, native))
    }

    fn ensure_existing_within_root(
        &self,
        normalized: &str,
        native: &Path,
    ) -> Result<PathBuf, FsError> {
        let canonical =
            fs::canonicalize(native).map_err(|err| FsError::from_io(normalized, &err))?;
        if canonical.starts_with(&self.root) {
            Ok(canonical)
        } else {
            Err(FsError::security(normalized))
        }
    }

    fn ensure_parent_within_root(
        &self,
        normalized: &str,
        native: &Path,
    ) -> Result<PathBuf, FsError> {
        let parent = native
            .parent()
            .ok_or_else(|| FsError::security(normalized))?;
        let canonical_parent =
            fs::canonicalize(parent).map_err(|err| FsError::from_io(normalized, &err))?;
        if canonical_parent.starts_with(&self.root) {
            Ok(canonical_parent)
        } else {
            Err(FsError::security(normalized))
        }
    }

    fn existing_folder(&self, path: &str) -> Result<(String, PathBuf), FsError> {
        let (normalized, native) = self.resolve_virtual_path(path)?;
        let canonical = self.ensure_existing_within_root(&normalized, &native)?;
        let metadata =
            fs::metadata(&canonical).map_err(|err| FsError::from_io(normalized.as_str(), &err))?;
        if !metadata.is_dir() {
            return Err(FsError::io(normalized, "not a folder"));
        }
        Ok((normalized, canonical))
    }

    fn child_path(
        &self,
        dir: &str,
        dir_native: &Path,
        name: &str,
    ) -> Result<(String, PathBuf), FsError> {
        if !is_valid_leaf_name(name) {
            return Err(FsError::security(join_virtual_path(dir, name)));
        }
        Ok((join_virtual_path(dir, name), dir_native.join(name)))
    }

    fn list_blocking(&self, path: &str) -> Result<Vec<FsEntry>, FsError> {
        let (normalized, native) = self.existing_folder(path)?;

        let mut entries = Vec::new();
        let reader =
            fs::read_dir(&native).map_err(|err| FsError::from_io(normalized.as_str(), &err))?;
        for entry in reader {
            let entry = entry.map_err(|err| FsError::from_io(normalized.as_str(), &err))?;
            let name = entry.file_name().to_string_lossy().to_string();
            match self.listed_child(&normalized, name, &entry.path()) {
                Ok(child) => entries.push(child),
                Err(err) => {
                    warn!(path = %err.path(), error = %err, "skipping unlistable entry");
                }
            }
        }

        entries.sort_by(|left, right| match (left.kind, right.kind) {
            (FsEntryKind::Folder, FsEntryKind::File) => std::cmp::Ordering::Less,
            (FsEntryKind::File, FsEntryKind::Folder) => std::cmp::Ordering::Greater,
            _ => left.name.cmp(&right.name),
        });
        Ok(entries)
    }

    fn listed_child(
        &self,
        parent: &str,
        name: String,
        child_native: &Path,
    ) -> Result<FsEntry, FsError> {
        let child_path = join_virtual_path(parent, &name);
        let canonical = fs::canonicalize(child_native)
            .map_err(|err| FsError::from_io(child_path.as_str(), &err))?;
        if !canonical.starts_with(&self.root) {
            return Err(FsError::security(child_path));
        }
        let metadata =
            fs::metadata(&canonical).map_err(|err| FsError::from_io(child_path.as_str(), &err))?;
        Ok(FsEntry::new(name, child_path, entry_kind(&metadata)))
    }

    fn create_folder_blocking(&self, path: &str, name: &str) -> Result<FsEntry, FsError> {
        let (dir, dir_native) = self.existing_folder(path)?;
        let (child, child_native) = self.child_path(&dir, &dir_native, name)?;
        fs::create_dir(&child_native).map_err(|err| FsError::from_io(child.as_str(), &err))?;
        debug!(path = %child, "created folder");
        Ok(FsEntry::new(name, child, FsEntryKind::Folder))
    }

    fn create_file_blocking(&self, path: &str, name: &str) -> Result<FsEntry, FsError> {
        let (dir, dir_native) = self.existing_folder(path)?;
        let (child, child_native) = self.child_path(&dir, &dir_native, name)?;
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&child_native)
            .map_err(|err| FsError::from_io(child.as_str(), &err))?;
        debug!(path = %child, "created file");
        Ok(FsEntry::new(name, child, FsEntryKind::File))
    }

    fn delete_blocking(&self, path: &str) -> Result<(), FsError> {
        let (normalized, native) = self.resolve_virtual_path(path)?;
        if normalized == "/" {
            return Err(FsError::io(normalized, "cannot delete the sandbox root"));
        }
        self.ensure_existing_within_root(&normalized, &native)?;

        let metadata = fs::symlink_metadata(&native)
            .map_err(|err| FsError::from_io(normalized.as_str(), &err))?;
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(&native)
        } else {
            fs::remove_file(&native)
        };
        removed.map_err(|err| FsError::from_io(normalized.as_str(), &err))?;
        debug!(path = %normalized, "deleted entry");
        Ok(())
    }

    fn rename_blocking(&self, path: &str, new_name: &str) -> Result<FsEntry, FsError> {
        let (normalized, native) = self.resolve_virtual_path(path)?;
        if normalized == "/" {
            return Err(FsError::io(normalized, "cannot rename the sandbox root"));
        }
        self.ensure_existing_within_root(&normalized, &native)?;

        let parent = parent_virtual_path(&normalized);
        let parent_native = native
            .parent()
            .ok_or_else(|| FsError::security(normalized.as_str()))?;
        let (dest, dest_native) = self.child_path(&parent, parent_native, new_name)?;
        self.ensure_parent_within_root(&dest, &dest_native)?;

        if dest != normalized {
            if fs::symlink_metadata(&dest_native).is_ok() {
                return Err(FsError::io(dest, "destination already exists"));
            }
            fs::rename(&native, &dest_native)
                .map_err(|err| FsError::from_io(normalized.as_str(), &err))?;
            debug!(from = %normalized, to = %dest, "renamed entry");
        }

        let metadata =
            fs::metadata(&dest_native).map_err(|err| FsError::from_io(dest.as_str(), &err))?;
        Ok(FsEntry::new(new_name, dest, entry_kind(&metadata)))
    }

    fn copy_blocking(&self, source: &str, dest_dir: &str) -> Result<FsEntry, FsError> {
        let (src, src_native) = self.resolve_virtual_path(source)?;
        let (dir, dir_native) = self.existing_folder(dest_dir)?;
        let Some(leaf) = virtual_leaf_name(&src) else {
            return Err(FsError::io(src.as_str(), "cannot copy the sandbox root"));
        };
        let src_canonical = self.ensure_existing_within_root(&src, &src_native)?;

        let metadata = fs::metadata(&src_canonical)
            .map_err(|err| FsError::from_io(src.as_str(), &err))?;
        if metadata.is_dir() && dir_native.starts_with(&src_canonical) {
            return Err(FsError::io(src.as_str(), "cannot copy a folder into itself"));
        }

        let taken = |candidate: &str| fs::symlink_metadata(dir_native.join(candidate)).is_ok();
        let name = if metadata.is_dir() {
            unique_child_name(leaf, None, taken)
        } else {
            let (stem, extension) = split_file_name(leaf);
            unique_child_name(stem, extension, taken)
        };
        let dest = join_virtual_path(&dir, &name);
        copy_recursive(&src_canonical, &dir_native.join(&name))
            .map_err(|err| FsError::from_io(dest.as_str(), &err))?;
        debug!(from = %src, to = %dest, "copied entry");
        Ok(FsEntry::new(name, dest, entry_kind(&metadata)))
    }

    fn read_structured_blocking(&self, path: &str) -> Result<Value, FsError> {
        let (normalized, native) = self.resolve_virtual_path(path)?;
        let canonical = self.ensure_existing_within_root(&normalized, &native)?;
        if fs::metadata(&canonical).map(|meta| meta.is_dir()).unwrap_or(false) {
            return Err(FsError::io(normalized, "not a file"));
        }

        let text = fs::read_to_string(&canonical).map_err(|err| match err.kind() {
            io::ErrorKind::InvalidData => FsError::Parse {
                path: normalized.clone(),
                message: "content is not valid UTF-8".to_string(),
            },
            _ => FsError::from_io(normalized.as_str(), &err),
        })?;
        serde_json::from_str(&text).map_err(|err| FsError::Parse {
            path: normalized,
            message: err.to_string(),
        })
    }

    fn write_structured_blocking(&self, path: &str, value: &Value) -> Result<FsEntry, FsError> {
        let (normalized, native) = self.resolve_virtual_path(path)?;
        let Some(name) = virtual_leaf_name(&normalized).map(str::to_string) else {
            return Err(FsError::io(normalized, "cannot write to the sandbox root"));
        };
        self.ensure_parent_within_root(&normalized, &native)?;
        if let Ok(existing) = fs::symlink_metadata(&native) {
            let canonical = self.ensure_existing_within_root(&normalized, &native)?;
            if existing.is_dir() || canonical.is_dir() {
                return Err(FsError::io(normalized, "not a file"));
            }
        }

        let text = serde_json::to_string_pretty(value)
            .map_err(|err| FsError::io(normalized.as_str(), err.to_string()))?;
        fs::write(&native, text).map_err(|err| FsError::from_io(normalized.as_str(), &err))?;
        debug!(path = %normalized, "wrote structured payload");
        Ok(FsEntry::new(name, normalized, FsEntryKind::File))
    }

    fn stat_blocking(&self, path: &str) -> Result<FsItemProperties, FsError> {
        let (normalized, native) = self.resolve_virtual_path(path)?;
        let canonical = self.ensure_existing_within_root(&normalized, &native)?;
        let metadata = fs::metadata(&canonical)
            .map_err(|err| FsError::from_io(normalized.as_str(), &err))?;

        Ok(FsItemProperties {
            name: virtual_leaf_name(&normalized).unwrap_or("/").to_string(),
            path: normalized,
            kind: entry_kind(&metadata),
            size: if metadata.is_file() { metadata.len() } else { 0 },
            created_at_unix_ms: unix_ms(metadata.created()),
            modified_at_unix_ms: unix_ms(metadata.modified()),
        })
    }

    fn create_shortcut_blocking(&self, target_path: &str) -> Result<FsEntry, FsError> {
        let (target, target_native) = self.resolve_virtual_path(target_path)?;
        let Some(leaf) = virtual_leaf_name(&target) else {
            return Err(FsError::io(
                target.as_str(),
                "cannot create a shortcut to the sandbox root",
            ));
        };
        self.ensure_existing_within_root(&target, &target_native)?;
        let parent_native = self.ensure_parent_within_root(&target, &target_native)?;

        let name = unique_child_name(leaf, Some(SHORTCUT_EXTENSION), |candidate| {
            fs::symlink_metadata(parent_native.join(candidate)).is_ok()
        });
        let payload = serde_json::to_value(ShortcutMetadata {
            target_path: target.clone(),
        })
        .map_err(|err| FsError::io(target.as_str(), err.to_string()))?;
        let shortcut_path = join_virtual_path(&parent_virtual_path(&target), &name);
        self.write_structured_blocking(&shortcut_path, &payload)
    }
}

impl FileStoreService for SandboxedFileStore {
    fn list<'a>(&'a self, path: &'a str) -> FileStoreFuture<'a, Result<Vec<FsEntry>, FsError>> {
        Box::pin(async move { logged("list", self.list_blocking(path)) })
    }

    fn create_folder<'a>(
        &'a self,
        path: &'a str,
        name: &'a str,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>> {
        Box::pin(async move { logged("create_folder", self.create_folder_blocking(path, name)) })
    }

    fn create_file<'a>(
        &'a self,
        path: &'a str,
        name: &'a str,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>> {
        Box::pin(async move { logged("create_file", self.create_file_blocking(path, name)) })
    }

    fn delete<'a>(&'a self, path: &'a str) -> FileStoreFuture<'a, Result<(), FsError>> {
        Box::pin(async move { logged("delete", self.delete_blocking(path)) })
    }

    fn rename<'a>(
        &'a self,
        path: &'a str,
        new_name: &'a str,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>> {
        Box::pin(async move { logged("rename", self.rename_blocking(path, new_name)) })
    }

    fn copy<'a>(
        &'a self,
        source: &'a str,
        dest_dir: &'a str,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>> {
        Box::pin(async move { logged("copy", self.copy_blocking(source, dest_dir)) })
    }

    fn read_structured<'a>(
        &'a self,
        path: &'a str,
    ) -> FileStoreFuture<'a, Result<Value, FsError>> {
        Box::pin(async move { logged("read_structured", self.read_structured_blocking(path)) })
    }

    fn write_structured<'a>(
        &'a self,
        path: &'a str,
        value: &'a Value,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>> {
        Box::pin(async move {
            logged(
                "write_structured",
                self.write_structured_blocking(path, value),
            )
        })
    }

    fn stat<'a>(
        &'a self,
        path: &'a str,
    ) -> FileStoreFuture<'a, Result<FsItemProperties, FsError>> {
        Box::pin(async move { logged("stat", self.stat_blocking(path)) })
    }

    fn create_shortcut<'a>(
        &'a self,
        target_path: &'a str,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>> {
        Box::pin(async move {
            logged(
                "create_shortcut",
                self.create_shortcut_blocking(target_path),
            )
        })
    }
}
