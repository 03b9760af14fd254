//! Application definition records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::metadata::AppBundleMetadata;
use crate::ApplicationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Window size in logical pixels.
pub struct WindowSize {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
/// How an application instance is started.
pub enum AppLaunchTarget {
    /// Rendered inside the desktop by the host UI.
    Internal,
    /// Delegated to an out-of-process handler at `path`.
    External {
        /// Handler entry point, opaque to the runtime.
        path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AppDefinitionRecord", into = "AppDefinitionRecord")]
/// Immutable catalog record for an installed application.
pub struct AppDefinition {
    /// Catalog identifier.
    pub id: ApplicationId,
    /// Display name, also the default window title.
    pub name: String,
    /// Icon token resolved by the rendering layer.
    pub icon: String,
    /// Lowercase file extensions (without dot) this app can open.
    pub extensions: BTreeSet<String>,
    /// Initial window size.
    pub default_size: WindowSize,
    /// Launch strategy.
    pub launch: AppLaunchTarget,
}

impl AppDefinition {
    /// Returns `true` when `extension` (with or without a leading dot, any case) is handled.
    pub fn handles_extension(&self, extension: &str) -> bool {
        let needle = normalize_extension(extension);
        !needle.is_empty() && self.extensions.contains(&needle)
    }

    /// Returns the external handler path when launch is delegated out of process.
    pub fn external_path(&self) -> Option<&str> {
        match &self.launch {
            AppLaunchTarget::External { path } => Some(path),
            AppLaunchTarget::Internal => None,
        }
    }

    /// Produces the definition obtained by overlaying `bundle` fields onto `self`.
    ///
    /// The id always stays the base definition's id; absent bundle fields keep base values.
    pub fn with_bundle(&self, bundle: &AppBundleMetadata) -> AppDefinition {
        let mut derived = self.clone();
        if let Some(name) = &bundle.name {
            derived.name = name.clone();
        }
        if let Some(icon) = &bundle.icon {
            derived.icon = icon.clone();
        }
        if let Some(extensions) = &bundle.extensions {
            derived.extensions = normalize_extensions(extensions);
        }
        if let Some(size) = bundle.default_size {
            derived.default_size = size;
        }

        let path = bundle
            .external_path
            .clone()
            .or_else(|| self.external_path().map(str::to_string));
        let external = bundle
            .is_external
            .unwrap_or(matches!(self.launch, AppLaunchTarget::External { .. }));
        derived.launch = match (external, path) {
            (true, Some(path)) => AppLaunchTarget::External { path },
            _ => AppLaunchTarget::Internal,
        };
        derived
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppDefinitionRecord {
    id: String,
    name: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    default_size: WindowSize,
    #[serde(default)]
    is_external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    external_path: Option<String>,
}

impl TryFrom<AppDefinitionRecord> for AppDefinition {
    type Error = String;

    fn try_from(record: AppDefinitionRecord) -> Result<Self, Self::Error> {
        let id = ApplicationId::new(record.id)?;
        let launch = match (record.is_external, record.external_path) {
            (true, Some(path)) if !path.trim().is_empty() => AppLaunchTarget::External { path },
            (true, _) => {
                return Err(format!("external app `{id}` is missing `externalPath`"));
            }
            (false, _) => AppLaunchTarget::Internal,
        };
        Ok(Self {
            id,
            name: record.name,
            icon: record.icon,
            extensions: normalize_extensions(&record.extensions),
            default_size: record.default_size,
            launch,
        })
    }
}

impl From<AppDefinition> for AppDefinitionRecord {
    fn from(definition: AppDefinition) -> Self {
        let (is_external, external_path) = match definition.launch {
            AppLaunchTarget::Internal => (false, None),
            AppLaunchTarget::External { path } => (true, Some(path)),
        };
        Self {
            id: definition.id.as_str().to_string(),
            name: definition.name,
            icon: definition.icon,
            extensions: definition.extensions.into_iter().collect(),
            default_size: definition.default_size,
            is_external,
            external_path,
        }
    }
}

fn normalize_extension(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn normalize_extensions(raw: &[String]) -> BTreeSet<String> {
    raw.iter()
        .map(|ext| normalize_extension(ext))
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn notebook() -> AppDefinition {
        serde_json::from_value(json!({
            "id": "notebook",
            "name": "Notebook",
            "icon": "notebook",
            "extensions": [".TXT", "md"],
            "defaultSize": { "width": 640, "height": 480 }
        }))
        .expect("definition")
    }

    #[test]
    fn definitions_normalize_extensions_and_default_to_internal_launch() {
        let def = notebook();
        assert!(def.handles_extension("txt"));
        assert!(def.handles_extension(".MD"));
        assert!(!def.handles_extension("png"));
        assert!(!def.handles_extension(""));
        assert_eq!(def.launch, AppLaunchTarget::Internal);
    }

    #[test]
    fn external_definitions_require_a_handler_path() {
        let err = serde_json::from_value::<AppDefinition>(json!({
            "id": "remote",
            "name": "Remote",
            "isExternal": true
        }))
        .expect_err("missing path rejected");
        assert!(err.to_string().contains("externalPath"));

        let def: AppDefinition = serde_json::from_value(json!({
            "id": "remote",
            "name": "Remote",
            "isExternal": true,
            "externalPath": "apps/remote/main.js"
        }))
        .expect("external definition");
        assert_eq!(def.external_path(), Some("apps/remote/main.js"));
    }

    #[test]
    fn bundle_overlay_replaces_only_supplied_fields() {
        let base = notebook();
        let bundle = AppBundleMetadata::from_value(json!({
            "appId": "notebook",
            "icon": "custom",
            "initialData": { "filePath": "/Desktop/todo.txt" }
        }))
        .expect("bundle");

        let derived = base.with_bundle(&bundle);
        assert_eq!(derived.icon, "custom");
        assert_eq!(derived.id, base.id);
        assert_eq!(derived.name, base.name);
        assert_eq!(derived.extensions, base.extensions);
        assert_eq!(derived.default_size, base.default_size);
        assert_eq!(derived.launch, AppLaunchTarget::Internal);
    }

    #[test]
    fn bundle_overlay_can_switch_to_external_launch() {
        let bundle = AppBundleMetadata {
            app_id: "notebook".to_string(),
            is_external: Some(true),
            external_path: Some("apps/tool/main.js".to_string()),
            ..AppBundleMetadata::default()
        };
        let derived = notebook().with_bundle(&bundle);
        assert_eq!(derived.external_path(), Some("apps/tool/main.js"));

        let flag_only = AppBundleMetadata {
            app_id: "notebook".to_string(),
            is_external: Some(true),
            ..AppBundleMetadata::default()
        };
        assert_eq!(
            notebook().with_bundle(&flag_only).launch,
            AppLaunchTarget::Internal
        );
    }

    #[test]
    fn bundles_without_app_id_are_rejected() {
        assert!(AppBundleMetadata::from_value(json!({ "icon": "x" })).is_err());
        assert!(AppBundleMetadata::from_value(json!({ "appId": "  " })).is_err());
        assert!(AppBundleMetadata::from_value(json!([1, 2])).is_err());
    }
}
