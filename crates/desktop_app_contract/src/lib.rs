//! Application catalog contract shared by the desktop runtime and its host.
//!
//! Defines the canonical [`ApplicationId`], the immutable [`AppDefinition`] catalog record, the
//! `.app` bundle overlay ([`AppBundleMetadata`]) and the [`AppRegistry`] lookup table loaded from
//! TOML at process start.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod definition;
pub mod metadata;
pub mod registry;

use serde::{Deserialize, Serialize};

pub use definition::{AppDefinition, AppLaunchTarget, WindowSize};
pub use metadata::{AppBundleMetadata, APP_BUNDLE_SUFFIX};
pub use registry::{
    AppRegistry, CatalogError, DEFAULT_VIEWER_APP_ID, FILE_EXPLORER_APP_ID, PROPERTIES_APP_ID,
};

const MAX_APPLICATION_ID_LEN: usize = 64;

/// Stable identifier for a catalog application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns an app identifier when `raw` starts with an ASCII letter and otherwise contains
    /// only ASCII alphanumerics, `-`, `_` or `.`.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_application_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!("invalid application id `{raw}`"))
        }
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creates an id without validation for trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ApplicationId {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ApplicationId> for String {
    fn from(id: ApplicationId) -> Self {
        id.0
    }
}

fn is_valid_application_id(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_APPLICATION_ID_LEN {
        return false;
    }
    if !bytes[0].is_ascii_alphabetic() {
        return false;
    }
    bytes
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}
