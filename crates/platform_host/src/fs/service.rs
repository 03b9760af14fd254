//! File store service contract.

use std::{future::Future, pin::Pin};

use serde_json::Value;

use super::{
    error::FsError,
    types::{FsEntry, FsItemProperties},
};

/// Object-safe boxed future used by [`FileStoreService`] async methods.
pub type FileStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for path-jailed filesystem operations.
///
/// Every path is a virtual path rooted at the sandbox root. Implementations reject any path or
/// computed destination that resolves outside that root with [`FsError::SecurityViolation`] and
/// never panic across this boundary.
pub trait FileStoreService {
    /// Lists the immediate children of a folder.
    fn list<'a>(&'a self, path: &'a str) -> FileStoreFuture<'a, Result<Vec<FsEntry>, FsError>>;

    /// Creates folder `name` inside `path`.
    fn create_folder<'a>(
        &'a self,
        path: &'a str,
        name: &'a str,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>>;

    /// Creates empty file `name` inside `path`.
    fn create_file<'a>(
        &'a self,
        path: &'a str,
        name: &'a str,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>>;

    /// Deletes a file, or a folder recursively.
    fn delete<'a>(&'a self, path: &'a str) -> FileStoreFuture<'a, Result<(), FsError>>;

    /// Renames an entry in place, keeping its parent folder.
    fn rename<'a>(
        &'a self,
        path: &'a str,
        new_name: &'a str,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>>;

    /// Recursively copies `source` into folder `dest_dir`.
    fn copy<'a>(
        &'a self,
        source: &'a str,
        dest_dir: &'a str,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>>;

    /// Reads and parses a UTF-8 JSON payload.
    fn read_structured<'a>(&'a self, path: &'a str)
        -> FileStoreFuture<'a, Result<Value, FsError>>;

    /// Serializes `value` as JSON to `path`, replacing an existing file.
    fn write_structured<'a>(
        &'a self,
        path: &'a str,
        value: &'a Value,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>>;

    /// Returns detailed properties for a path.
    fn stat<'a>(&'a self, path: &'a str) -> FileStoreFuture<'a, Result<FsItemProperties, FsError>>;

    /// Creates a `.shortcut` entry next to `target_path` pointing at it.
    fn create_shortcut<'a>(
        &'a self,
        target_path: &'a str,
    ) -> FileStoreFuture<'a, Result<FsEntry, FsError>>;
}
