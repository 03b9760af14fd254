//! Installed-application catalog with id and extension lookups.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::definition::AppDefinition;

/// Built-in folder browser launched for folder entries.
pub const FILE_EXPLORER_APP_ID: &str = "fileExplorer";
/// Built-in viewer launched for generic files.
pub const DEFAULT_VIEWER_APP_ID: &str = "notebook";
/// Built-in item-properties app.
pub const PROPERTIES_APP_ID: &str = "properties";

const BUILTIN_CATALOG_TOML: &str = include_str!("../catalog/apps.toml");

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors raised while loading an application catalog.
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read app catalog {path}: {message}")]
    Read {
        /// Catalog file path.
        path: String,
        /// I/O diagnostic.
        message: String,
    },
    /// The catalog document is not valid TOML or contains an invalid definition.
    #[error("failed to parse app catalog: {0}")]
    Parse(String),
    /// Two definitions share an id.
    #[error("duplicate app id `{0}` in catalog")]
    DuplicateId(String),
    /// A definition has a blank display name.
    #[error("app `{0}` has an empty display name")]
    EmptyName(String),
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    apps: Vec<AppDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Immutable catalog of [`AppDefinition`] records, loaded once at process start.
pub struct AppRegistry {
    apps: Vec<AppDefinition>,
}

impl AppRegistry {
    /// Builds a registry from definitions, validating ids and names.
    pub fn new(apps: Vec<AppDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for app in &apps {
            if !seen.insert(app.id.as_str().to_string()) {
                return Err(CatalogError::DuplicateId(app.id.to_string()));
            }
            if app.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(app.id.to_string()));
            }
        }
        debug!(count = apps.len(), "app registry loaded");
        Ok(Self { apps })
    }

    /// Parses a TOML catalog made of `[[apps]]` tables.
    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            toml::from_str(raw).map_err(|err| CatalogError::Parse(err.to_string()))?;
        Self::new(document.apps)
    }

    /// Reads and parses a TOML catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|err| CatalogError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Returns the catalog shipped with the runtime.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG_TOML)
    }

    /// Looks up a definition by id.
    pub fn by_id(&self, id: &str) -> Option<&AppDefinition> {
        self.apps.iter().find(|app| app.id.as_str() == id)
    }

    /// Returns every definition that declares `extension` (case-insensitive, dot optional).
    ///
    /// Used to populate "Open with" candidates; catalog order is preserved.
    pub fn by_extension(&self, extension: &str) -> Vec<&AppDefinition> {
        self.apps
            .iter()
            .filter(|app| app.handles_extension(extension))
            .collect()
    }

    /// Iterates definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &AppDefinition> {
        self.apps.iter()
    }

    /// Number of installed definitions.
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// Returns `true` when the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
