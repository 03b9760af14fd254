//! Maps filesystem entries to application launches.
//!
//! Resolution order: explicit "open with" override, `.shortcut` indirection, folders, `.app`
//! bundles, then the default viewer. Every failure is logged where it is detected and returned as
//! [`ResolveOutcome::Fail`]; nothing here creates an instance.

use std::collections::HashSet;

use desktop_app_contract::{
    AppBundleMetadata, AppDefinition, AppRegistry, APP_BUNDLE_SUFFIX, DEFAULT_VIEWER_APP_ID,
    FILE_EXPLORER_APP_ID, PROPERTIES_APP_ID,
};
use platform_host::{
    normalize_virtual_path, FileStoreService, FsEntry, FsError, ShortcutMetadata,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DEFAULT_MAX_SHORTCUT_DEPTH;
use crate::model::WindowPosition;
use crate::window_manager::OpenInstanceRequest;

/// Fixed position used for item-properties windows.
pub const PROPERTIES_WINDOW_POSITION: WindowPosition = WindowPosition { x: 150, y: 150 };

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reasons an entry could not be resolved to a launch.
pub enum ResolveError {
    /// A path escaped the sandbox root.
    #[error("path escapes the sandbox: {path}")]
    SecurityViolation {
        /// Offending path.
        path: String,
    },
    /// A shortcut target does not exist.
    #[error("shortcut target not found: {path}")]
    NotFound {
        /// Missing path.
        path: String,
    },
    /// Metadata or target could not be read.
    #[error("failed to read {path}: {message}")]
    IoFailure {
        /// Path being read.
        path: String,
        /// Diagnostic.
        message: String,
    },
    /// A `.shortcut` or `.app` payload is malformed.
    #[error("malformed metadata in {path}: {message}")]
    ParseFailure {
        /// Metadata path.
        path: String,
        /// Diagnostic.
        message: String,
    },
    /// An app id is not in the registry.
    #[error("unknown app `{app_id}`")]
    UnknownApp {
        /// Missing id.
        app_id: String,
    },
    /// Shortcut indirection revisited a path or exceeded the depth cap.
    #[error("shortcut cycle detected at {path}")]
    CycleDetected {
        /// Shortcut at which resolution stopped.
        path: String,
    },
}

impl ResolveError {
    fn from_target_stat(err: FsError) -> Self {
        match err {
            FsError::SecurityViolation { path } => Self::SecurityViolation { path },
            FsError::NotFound { path } => Self::NotFound { path },
            FsError::Io { path, message } | FsError::Parse { path, message } => {
                Self::IoFailure { path, message }
            }
        }
    }

    fn from_shortcut_read(err: FsError) -> Self {
        match err {
            FsError::SecurityViolation { path } => Self::SecurityViolation { path },
            FsError::Parse { path, message } => Self::ParseFailure { path, message },
            FsError::NotFound { path } => Self::IoFailure {
                message: "shortcut file is missing".to_string(),
                path,
            },
            FsError::Io { path, message } => Self::IoFailure { path, message },
        }
    }

    fn from_bundle_read(err: FsError) -> Self {
        match err {
            FsError::SecurityViolation { path } => Self::SecurityViolation { path },
            FsError::NotFound { path } => Self::ParseFailure {
                message: "bundle file is missing".to_string(),
                path,
            },
            FsError::Io { path, message } | FsError::Parse { path, message } => {
                Self::ParseFailure { path, message }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Parameters handed to a launched instance.
pub enum LaunchParams {
    /// Open a file in a viewer.
    File {
        /// Virtual path of the file.
        file_path: String,
    },
    /// Browse a folder.
    Folder {
        /// Virtual path of the folder.
        initial_path: String,
    },
    /// Inspect an entry.
    Properties {
        /// Virtual path of the inspected entry.
        path: String,
    },
    /// Data supplied by an `.app` bundle, if any.
    Bundle(Option<Value>),
}

impl LaunchParams {
    /// JSON shape passed as the instance's initial data.
    pub fn to_value(&self) -> Value {
        match self {
            Self::File { file_path } => json!({ "filePath": file_path }),
            Self::Folder { initial_path } => json!({ "initialPath": initial_path }),
            Self::Properties { path } => json!({ "path": path }),
            Self::Bundle(data) => data.clone().unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A resolved launch: which definition to open and with what.
pub struct LaunchPlan {
    /// Definition to launch, including any bundle overlay.
    pub definition: AppDefinition,
    /// Instance parameters.
    pub params: LaunchParams,
    /// Title override; `None` uses the definition name.
    pub title: Option<String>,
    /// Position override; `None` uses the cascade.
    pub position: Option<WindowPosition>,
}

impl LaunchPlan {
    fn new(definition: AppDefinition, params: LaunchParams) -> Self {
        Self {
            definition,
            params,
            title: None,
            position: None,
        }
    }

    /// Converts the plan into a window-manager open request.
    pub fn into_request(self) -> OpenInstanceRequest {
        OpenInstanceRequest {
            initial_data: self.params.to_value(),
            definition: self.definition,
            title: self.title,
            position: self.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Result of resolving an entry.
pub enum ResolveOutcome {
    /// Launch the plan.
    Launch(LaunchPlan),
    /// Abort; no instance is created.
    Fail(ResolveError),
}

impl ResolveOutcome {
    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<LaunchPlan, ResolveError> {
        match self {
            Self::Launch(plan) => Ok(plan),
            Self::Fail(err) => Err(err),
        }
    }
}

/// Resolves entries against a file store and an app registry.
pub struct ItemResolver<'a> {
    store: &'a dyn FileStoreService,
    registry: &'a AppRegistry,
    max_shortcut_depth: usize,
}

impl<'a> ItemResolver<'a> {
    /// Creates a resolver with the default shortcut depth cap.
    pub fn new(store: &'a dyn FileStoreService, registry: &'a AppRegistry) -> Self {
        Self {
            store,
            registry,
            max_shortcut_depth: DEFAULT_MAX_SHORTCUT_DEPTH,
        }
    }

    /// Sets the maximum number of `.shortcut` hops.
    pub fn with_max_shortcut_depth(mut self, depth: usize) -> Self {
        self.max_shortcut_depth = depth.max(1);
        self
    }

    /// Resolves `entry`, optionally forcing the app `open_with`.
    pub async fn resolve(&self, entry: &FsEntry, open_with: Option<&str>) -> ResolveOutcome {
        match self.resolve_inner(entry, open_with).await {
            Ok(plan) => {
                debug!(
                    path = %entry.path,
                    app = %plan.definition.id,
                    "resolved entry to launch"
                );
                ResolveOutcome::Launch(plan)
            }
            Err(err) => {
                warn!(path = %entry.path, error = %err, "failed to resolve entry");
                ResolveOutcome::Fail(err)
            }
        }
    }

    /// Builds the launch for the item-properties app inspecting `entry`.
    pub fn properties_for(&self, entry: &FsEntry) -> Result<LaunchPlan, ResolveError> {
        let definition = self.lookup(PROPERTIES_APP_ID)?;
        let mut plan = LaunchPlan::new(
            definition,
            LaunchParams::Properties {
                path: entry.path.clone(),
            },
        );
        plan.title = Some(format!("Properties: {}", entry.name));
        plan.position = Some(PROPERTIES_WINDOW_POSITION);
        Ok(plan)
    }

    async fn resolve_inner(
        &self,
        entry: &FsEntry,
        open_with: Option<&str>,
    ) -> Result<LaunchPlan, ResolveError> {
        if let Some(app_id) = open_with {
            let definition = self.lookup(app_id)?;
            return Ok(LaunchPlan::new(
                definition,
                LaunchParams::File {
                    file_path: entry.path.clone(),
                },
            ));
        }

        let mut current = entry.clone();
        let mut visited = HashSet::new();
        while current.is_shortcut() {
            let key = normalize_virtual_path(&current.path).unwrap_or_else(|| current.path.clone());
            if !visited.insert(key) || visited.len() > self.max_shortcut_depth {
                return Err(ResolveError::CycleDetected { path: current.path });
            }
            current = self.follow_shortcut(&current.path).await?;
        }

        if current.is_folder() {
            let definition = self.lookup(FILE_EXPLORER_APP_ID)?;
            return Ok(LaunchPlan::new(
                definition,
                LaunchParams::Folder {
                    initial_path: current.path,
                },
            ));
        }

        if current.name.ends_with(APP_BUNDLE_SUFFIX) {
            return self.launch_bundle(&current.path).await;
        }

        let definition = self.lookup(DEFAULT_VIEWER_APP_ID)?;
        Ok(LaunchPlan::new(
            definition,
            LaunchParams::File {
                file_path: current.path,
            },
        ))
    }

    async fn follow_shortcut(&self, path: &str) -> Result<FsEntry, ResolveError> {
        let payload = self
            .store
            .read_structured(path)
            .await
            .map_err(ResolveError::from_shortcut_read)?;
        let shortcut: ShortcutMetadata =
            serde_json::from_value(payload).map_err(|err| ResolveError::ParseFailure {
                path: path.to_string(),
                message: err.to_string(),
            })?;
        let target = self
            .store
            .stat(&shortcut.target_path)
            .await
            .map_err(ResolveError::from_target_stat)?;
        Ok(target.to_entry())
    }

    async fn launch_bundle(&self, path: &str) -> Result<LaunchPlan, ResolveError> {
        let payload = self
            .store
            .read_structured(path)
            .await
            .map_err(ResolveError::from_bundle_read)?;
        let bundle =
            AppBundleMetadata::from_value(payload).map_err(|message| ResolveError::ParseFailure {
                path: path.to_string(),
                message,
            })?;
        let base = self.lookup(&bundle.app_id)?;
        Ok(LaunchPlan::new(
            base.with_bundle(&bundle),
            LaunchParams::Bundle(bundle.initial_data.clone()),
        ))
    }

    fn lookup(&self, app_id: &str) -> Result<AppDefinition, ResolveError> {
        self.registry
            .by_id(app_id)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownApp {
                app_id: app_id.to_string(),
            })
    }
}
