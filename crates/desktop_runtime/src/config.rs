//! TOML-backed runtime configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{WindowBounds, WindowPosition};
use desktop_app_contract::WindowSize;

/// Default number of `.shortcut` hops followed before resolution gives up.
pub const DEFAULT_MAX_SHORTCUT_DEPTH: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors raised while loading [`DesktopConfig`].
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Config file path.
        path: String,
        /// I/O diagnostic.
        message: String,
    },
    /// The document is not valid TOML for [`DesktopConfig`].
    #[error("failed to parse desktop config: {0}")]
    Parse(String),
    /// A value parsed but is unusable.
    #[error("invalid desktop config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Window placement policy used when opening instances.
pub struct WindowLayoutConfig {
    /// Position of the first instance and of every cascade wrap.
    pub default_position: WindowPosition,
    /// Offset applied to each subsequent instance.
    pub cascade_step: WindowPosition,
    /// Number of cascade steps before placement wraps back to `default_position`.
    pub cascade_wrap: u32,
    /// Area filled by a maximized instance.
    pub viewport: WindowBounds,
}

impl Default for WindowLayoutConfig {
    fn default() -> Self {
        Self {
            default_position: WindowPosition { x: 100, y: 100 },
            cascade_step: WindowPosition { x: 30, y: 30 },
            cascade_wrap: 10,
            viewport: WindowBounds {
                position: WindowPosition { x: 0, y: 0 },
                size: WindowSize {
                    width: 1280,
                    height: 720,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Process-wide desktop settings.
///
/// Every field has a working default, so partial documents are accepted.
pub struct DesktopConfig {
    /// Native directory jailing every filesystem operation.
    pub sandbox_root: PathBuf,
    /// Virtual path listed as the desktop surface.
    pub desktop_folder: String,
    /// App ids pinned to the taskbar at startup.
    pub pinned_apps: Vec<String>,
    /// Maximum `.shortcut` indirection depth.
    pub max_shortcut_depth: usize,
    /// Window placement policy.
    pub window: WindowLayoutConfig,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            sandbox_root: PathBuf::from("sandbox"),
            desktop_folder: "/Desktop".to_string(),
            pinned_apps: vec!["notebook".to_string()],
            max_shortcut_depth: DEFAULT_MAX_SHORTCUT_DEPTH,
            window: WindowLayoutConfig::default(),
        }
    }
}

impl DesktopConfig {
    /// Parses a TOML document over the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&body)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_shortcut_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_shortcut_depth must be at least 1".to_string(),
            ));
        }
        if !self.desktop_folder.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "desktop_folder `{}` must be an absolute virtual path",
                self.desktop_folder
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    #[test]
    fn partial_documents_fill_in_defaults() {
        let config = DesktopConfig::from_toml_str(
            r#"
            sandbox_root = "/srv/desktop"
            pinned_apps = ["notebook", "fileExplorer"]

            [window]
            cascade_wrap = 4
            "#,
        )
        .expect("parse config");

        assert_eq!(config.sandbox_root, PathBuf::from("/srv/desktop"));
        assert_eq!(config.pinned_apps, vec!["notebook", "fileExplorer"]);
        assert_eq!(config.desktop_folder, "/Desktop");
        assert_eq!(config.max_shortcut_depth, DEFAULT_MAX_SHORTCUT_DEPTH);
        assert_eq!(config.window.cascade_wrap, 4);
        assert_eq!(
            config.window.default_position,
            WindowLayoutConfig::default().default_position
        );
    }

    #[test]
    fn shipped_config_matches_the_defaults() {
        let shipped = DesktopConfig::from_toml_str(include_str!("../config/desktop.toml"))
            .expect("shipped config parses");
        assert_eq!(shipped, DesktopConfig::default());
    }

    #[test]
    fn empty_document_is_the_default_config() {
        assert_eq!(
            DesktopConfig::from_toml_str("").expect("empty config"),
            DesktopConfig::default()
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            DesktopConfig::from_toml_str("max_shortcut_depth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DesktopConfig::from_toml_str("desktop_folder = \"Desktop\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DesktopConfig::from_toml_str("pinned_apps = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file_with_its_path() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("desktop-config-missing-{nanos}.toml"));
        let err = DesktopConfig::load(&path).expect_err("missing config");
        assert!(err.to_string().contains("desktop-config-missing"));
    }
}
