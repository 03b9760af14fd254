//! Async command handlers.
//!
//! Commands await file-store and resolver work and deliver their results as follow-up
//! [`DesktopAction`]s through the runtime mailbox, so state is still mutated only by the reducer.

use std::rc::Rc;

use desktop_app_contract::AppRegistry;
use futures::channel::mpsc::UnboundedSender;
use platform_host::{FileStoreService, FsEntry, FsEntryKind, FsError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DesktopConfig;
use crate::model::ClipboardSlot;
use crate::reducer::DesktopAction;
use crate::resolver::{ItemResolver, ResolveError};

const NEW_FOLDER_STEM: &str = "New Folder";
const NEW_TEXT_FILE_STEM: &str = "New Text File";
const NEW_TEXT_FILE_EXTENSION: &str = "txt";

#[derive(Debug, Clone, PartialEq)]
/// User-triggered asynchronous operations.
pub enum DesktopCommand {
    /// Resolve and launch an entry, optionally forcing an app.
    OpenEntry {
        /// Entry to open.
        entry: FsEntry,
        /// "Open with" app id.
        open_with: Option<String>,
    },
    /// Open the item-properties app for an entry.
    OpenProperties {
        /// Inspected entry.
        entry: FsEntry,
    },
    /// Re-list the desktop folder.
    RefreshDesktop,
    /// Create `New Folder` (or the next free `New Folder (n)`) in `parent`.
    NewFolder {
        /// Target folder.
        parent: String,
    },
    /// Create `New Text File.txt` (or the next free variant) in `parent`.
    NewTextFile {
        /// Target folder.
        parent: String,
    },
    /// Copy the clipboard entry into `dest_dir`, leaving the slot populated.
    Paste {
        /// Destination folder.
        dest_dir: String,
    },
    /// Delete an entry.
    Delete {
        /// Entry path.
        path: String,
    },
    /// Rename an entry in place.
    Rename {
        /// Entry path.
        path: String,
        /// New leaf name.
        new_name: String,
    },
    /// Create a `.shortcut` next to an entry.
    CreateShortcut {
        /// Shortcut target.
        target_path: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reasons a command did not complete.
pub enum CommandError {
    /// A file-store operation failed.
    #[error(transparent)]
    Fs(#[from] FsError),
    /// Entry resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Paste was requested with an empty clipboard.
    #[error("clipboard is empty")]
    EmptyClipboard,
    /// The runtime was shut down before the follow-up could be delivered.
    #[error("desktop runtime mailbox is closed")]
    MailboxClosed,
}

/// Everything a command needs, detached from the runtime so it can run while the runtime keeps
/// applying other actions.
#[derive(Clone)]
pub struct CommandContext {
    pub(crate) store: Rc<dyn FileStoreService>,
    pub(crate) registry: Rc<AppRegistry>,
    pub(crate) config: Rc<DesktopConfig>,
    pub(crate) clipboard: Option<ClipboardSlot>,
    pub(crate) mailbox: UnboundedSender<DesktopAction>,
}

impl CommandContext {
    /// Runs `command` to completion, posting follow-ups to the mailbox.
    ///
    /// Failures are logged and returned; no partial follow-up is posted for a failed step.
    pub async fn execute(&self, command: DesktopCommand) -> Result<(), CommandError> {
        let result = self.execute_inner(command).await;
        if let Err(err) = &result {
            warn!(error = %err, "desktop command failed");
        }
        result
    }

    async fn execute_inner(&self, command: DesktopCommand) -> Result<(), CommandError> {
        match command {
            DesktopCommand::OpenEntry { entry, open_with } => {
                let plan = self
                    .resolver()
                    .resolve(&entry, open_with.as_deref())
                    .await
                    .into_result()?;
                self.post(DesktopAction::OpenInstance(plan.into_request()))
            }
            DesktopCommand::OpenProperties { entry } => {
                let plan = self.resolver().properties_for(&entry)?;
                self.post(DesktopAction::OpenInstance(plan.into_request()))
            }
            DesktopCommand::RefreshDesktop => self.refresh_desktop().await,
            DesktopCommand::NewFolder { parent } => {
                let name = self.free_name(&parent, NEW_FOLDER_STEM, None).await?;
                let created = self.store.create_folder(&parent, &name).await?;
                debug!(path = %created.path, "created folder");
                self.refresh_desktop().await
            }
            DesktopCommand::NewTextFile { parent } => {
                let name = self
                    .free_name(&parent, NEW_TEXT_FILE_STEM, Some(NEW_TEXT_FILE_EXTENSION))
                    .await?;
                let created = self.store.create_file(&parent, &name).await?;
                debug!(path = %created.path, "created file");
                self.refresh_desktop().await
            }
            DesktopCommand::Paste { dest_dir } => {
                let Some(slot) = &self.clipboard else {
                    return Err(CommandError::EmptyClipboard);
                };
                let copied = self.store.copy(&slot.entry.path, &dest_dir).await?;
                debug!(path = %copied.path, "pasted entry");
                self.refresh_desktop().await
            }
            DesktopCommand::Delete { path } => {
                self.store.delete(&path).await?;
                debug!(%path, "deleted entry");
                self.refresh_desktop().await
            }
            DesktopCommand::Rename { path, new_name } => {
                let renamed = self.store.rename(&path, &new_name).await?;
                debug!(from = %path, to = %renamed.path, "renamed entry");
                self.refresh_desktop().await
            }
            DesktopCommand::CreateShortcut { target_path } => {
                let shortcut = self.store.create_shortcut(&target_path).await?;
                debug!(path = %shortcut.path, "created shortcut");
                self.refresh_desktop().await
            }
        }
    }

    fn resolver(&self) -> ItemResolver<'_> {
        ItemResolver::new(self.store.as_ref(), self.registry.as_ref())
            .with_max_shortcut_depth(self.config.max_shortcut_depth)
    }

    async fn refresh_desktop(&self) -> Result<(), CommandError> {
        let items = self.store.list(&self.config.desktop_folder).await?;
        self.post(DesktopAction::SetDesktopItems { items })
    }

    async fn free_name(
        &self,
        parent: &str,
        stem: &str,
        extension: Option<&str>,
    ) -> Result<String, CommandError> {
        let existing: Vec<String> = self
            .store
            .list(parent)
            .await?
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        Ok(platform_host::unique_child_name(stem, extension, |candidate| {
            existing.iter().any(|name| name == candidate)
        }))
    }

    fn post(&self, action: DesktopAction) -> Result<(), CommandError> {
        self.mailbox
            .unbounded_send(action)
            .map_err(|_| CommandError::MailboxClosed)
    }
}

/// Entry describing the desktop folder itself, used for background "Properties".
pub fn desktop_folder_entry(config: &DesktopConfig) -> FsEntry {
    let name = platform_host::virtual_leaf_name(&config.desktop_folder)
        .unwrap_or("Desktop")
        .to_string();
    FsEntry::new(name, config.desktop_folder.clone(), FsEntryKind::Folder)
}
