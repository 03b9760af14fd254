//! Failure taxonomy for sandboxed file store operations.

use std::io;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Coarse failure category, stable across messages.
pub enum FsErrorKind {
    /// Path escapes the sandbox root.
    SecurityViolation,
    /// Path does not exist.
    NotFound,
    /// Generic I/O failure or an operation invalid for the node type.
    Io,
    /// Structured payload could not be parsed.
    Parse,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Error returned by every [`crate::FileStoreService`] operation.
pub enum FsError {
    /// The requested path (or a computed destination) resolves outside the sandbox root.
    #[error("path `{path}` resolves outside the sandbox root")]
    SecurityViolation {
        /// Offending path as supplied by the caller.
        path: String,
    },
    /// The requested path does not exist.
    #[error("path `{path}` was not found")]
    NotFound {
        /// Missing path.
        path: String,
    },
    /// Underlying storage failed or rejected the operation.
    #[error("i/o failure on `{path}`: {message}")]
    Io {
        /// Path the operation targeted.
        path: String,
        /// Storage-level diagnostic.
        message: String,
    },
    /// A structured (JSON) payload was malformed.
    #[error("failed to parse `{path}`: {message}")]
    Parse {
        /// Path of the malformed payload.
        path: String,
        /// Parser diagnostic.
        message: String,
    },
}

impl FsError {
    /// Builds a security violation for `path`.
    pub fn security(path: impl Into<String>) -> Self {
        Self::SecurityViolation { path: path.into() }
    }

    /// Builds a not-found error for `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Builds an I/O failure with a custom message.
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classifies a [`std::io::Error`], mapping missing nodes to [`FsError::NotFound`].
    pub fn from_io(path: impl Into<String>, err: &io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io {
                path,
                message: err.to_string(),
            },
        }
    }

    /// Returns the failure category.
    pub fn kind(&self) -> FsErrorKind {
        match self {
            Self::SecurityViolation { .. } => FsErrorKind::SecurityViolation,
            Self::NotFound { .. } => FsErrorKind::NotFound,
            Self::Io { .. } => FsErrorKind::Io,
            Self::Parse { .. } => FsErrorKind::Parse,
        }
    }

    /// Returns the path the failure refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::SecurityViolation { path }
            | Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::Parse { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_classify_missing_nodes_as_not_found() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(
            FsError::from_io("/a", &missing).kind(),
            FsErrorKind::NotFound
        );

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let err = FsError::from_io("/a", &denied);
        assert_eq!(err.kind(), FsErrorKind::Io);
        assert_eq!(err.path(), "/a");
    }
}
