//! Typed host-domain contracts for the sandboxed desktop filesystem.
//!
//! This crate is the API-first boundary for storage. It exposes the virtual-path helpers, entry
//! models and failure taxonomy shared by every consumer, the object-safe [`FileStoreService`]
//! contract, and [`SandboxedFileStore`], the native implementation jailed to a canonical root
//! directory.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod fs;

pub use fs::error::{FsError, FsErrorKind};
pub use fs::path::{
    file_extension, is_valid_leaf_name, join_virtual_path, normalize_virtual_path,
    parent_virtual_path, split_file_name, unique_child_name, virtual_leaf_name,
};
pub use fs::sandbox::SandboxedFileStore;
pub use fs::service::{FileStoreFuture, FileStoreService};
pub use fs::types::{
    FsEntry, FsEntryKind, FsItemProperties, ShortcutMetadata, SHORTCUT_EXTENSION, SHORTCUT_SUFFIX,
};
