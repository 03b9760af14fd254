//! Long-lived runtime container for the desktop.
//!
//! [`DesktopRuntime`] owns the reducer state, the queued runtime effects, and the follow-up
//! mailbox that async commands report into. It is created once at startup and torn down with
//! [`DesktopRuntime::shutdown`].

use std::path::Path;
use std::rc::Rc;

use desktop_app_contract::{AppDefinition, AppRegistry, ApplicationId, CatalogError};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use platform_host::{FileStoreService, FsError, SandboxedFileStore};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::commands::{CommandContext, CommandError, DesktopCommand};
use crate::config::{ConfigError, DesktopConfig};
use crate::model::{DesktopState, InstanceId};
use crate::reducer::{reduce_desktop, DesktopAction, RuntimeEffect};
use crate::window_manager::OpenInstanceRequest;

#[derive(Debug, Error)]
/// Errors raised while booting a [`DesktopRuntime`] from disk.
pub enum BootError {
    /// The desktop config could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The app catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The sandbox root could not be opened.
    #[error(transparent)]
    Sandbox(#[from] FsError),
}

/// Explicit owner of desktop state; every mutation goes through [`DesktopRuntime::dispatch`].
pub struct DesktopRuntime {
    config: Rc<DesktopConfig>,
    registry: Rc<AppRegistry>,
    store: Rc<dyn FileStoreService>,
    state: DesktopState,
    effects: Vec<RuntimeEffect>,
    mailbox_tx: UnboundedSender<DesktopAction>,
    mailbox_rx: UnboundedReceiver<DesktopAction>,
}

impl DesktopRuntime {
    /// Creates a runtime over an existing store and registry.
    ///
    /// Pinned apps from `config` that are invalid ids are skipped with a warning.
    pub fn new(
        config: DesktopConfig,
        registry: AppRegistry,
        store: Rc<dyn FileStoreService>,
    ) -> Self {
        let pinned = config
            .pinned_apps
            .iter()
            .filter_map(|raw| match ApplicationId::new(raw.as_str()) {
                Ok(id) => Some(id),
                Err(err) => {
                    warn!(error = %err, "ignoring pinned app");
                    None
                }
            })
            .collect::<Vec<_>>();
        let (mailbox_tx, mailbox_rx) = mpsc::unbounded();
        Self {
            state: DesktopState::with_pinned_apps(pinned),
            config: Rc::new(config),
            registry: Rc::new(registry),
            store,
            effects: Vec::new(),
            mailbox_tx,
            mailbox_rx,
        }
    }

    /// Boots from a TOML config file using the built-in catalog and a sandbox at the
    /// configured root.
    pub fn boot(config_path: &Path) -> Result<Self, BootError> {
        let config = DesktopConfig::load(config_path)?;
        Self::from_config(config)
    }

    /// Boots from an in-memory config using the built-in catalog.
    pub fn from_config(config: DesktopConfig) -> Result<Self, BootError> {
        let registry = AppRegistry::builtin()?;
        let store = SandboxedFileStore::from_root(&config.sandbox_root)?;
        Ok(Self::new(config, registry, Rc::new(store)))
    }

    /// Current desktop state for rendering.
    pub fn state(&self) -> &DesktopState {
        &self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    /// Installed app catalog.
    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    /// Applies one action synchronously and completely.
    pub fn dispatch(&mut self, action: DesktopAction) {
        let new_effects = reduce_desktop(&mut self.state, &self.config.window, action);
        self.effects.extend(new_effects);
    }

    /// Launches `definition` and returns the new instance id.
    pub fn open(&mut self, definition: AppDefinition, initial_data: Value) -> InstanceId {
        let instance_id = self.state.peek_next_instance_id();
        self.dispatch(DesktopAction::OpenInstance(OpenInstanceRequest::new(
            definition,
            initial_data,
        )));
        instance_id
    }

    /// Snapshot of the handles and state a command needs.
    pub fn command_context(&self) -> CommandContext {
        CommandContext {
            store: Rc::clone(&self.store),
            registry: Rc::clone(&self.registry),
            config: Rc::clone(&self.config),
            clipboard: self.state.clipboard.clone(),
            mailbox: self.mailbox_tx.clone(),
        }
    }

    /// Runs a command to completion and applies its follow-ups.
    pub async fn run_command(&mut self, command: DesktopCommand) -> Result<(), CommandError> {
        let context = self.command_context();
        let result = context.execute(command).await;
        self.pump();
        result
    }

    /// Applies every queued follow-up in arrival order and returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(Some(action)) = self.mailbox_rx.try_next() {
            self.dispatch(action);
            applied += 1;
        }
        applied
    }

    /// Drains effects queued for the host.
    pub fn take_effects(&mut self) -> Vec<RuntimeEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Closes the mailbox, applies what already arrived, and returns the final state.
    ///
    /// Commands still in flight observe [`CommandError::MailboxClosed`] when they finish.
    pub fn shutdown(mut self) -> DesktopState {
        self.mailbox_rx.close();
        let applied = self.pump();
        debug!(applied, "desktop runtime shut down");
        self.state
    }
}
