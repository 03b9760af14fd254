//! `.app` bundle payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::definition::WindowSize;

/// File-name suffix marking an application bundle entry.
pub const APP_BUNDLE_SUFFIX: &str = ".app";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
/// Payload of a `.app` entry: a base app id plus optional field overrides.
pub struct AppBundleMetadata {
    /// Id of the catalog definition this bundle derives from.
    pub app_id: String,
    /// Display-name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Icon override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Extension-set override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    /// Default-size override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_size: Option<WindowSize>,
    /// External-launch flag override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_external: Option<bool>,
    /// External handler path override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_path: Option<String>,
    /// Data passed to the launched instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_data: Option<Value>,
}

impl AppBundleMetadata {
    /// Parses a bundle payload, rejecting a missing or blank `appId`.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let bundle: Self = serde_json::from_value(value).map_err(|err| err.to_string())?;
        if bundle.app_id.trim().is_empty() {
            return Err("bundle `appId` is empty".to_string());
        }
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn bundle_payloads_use_camel_case_keys() {
        let bundle = AppBundleMetadata::from_value(json!({
            "appId": "notebook",
            "defaultSize": { "width": 300, "height": 200 },
            "isExternal": false,
            "initialData": { "filePath": "/a.txt" }
        }))
        .expect("bundle");
        assert_eq!(bundle.app_id, "notebook");
        assert_eq!(
            bundle.default_size,
            Some(WindowSize {
                width: 300,
                height: 200
            })
        );
        assert_eq!(bundle.is_external, Some(false));
        assert_eq!(bundle.name, None);
        assert_eq!(bundle.initial_data, Some(json!({ "filePath": "/a.txt" })));
    }
}
