//! Context-menu models for the desktop surface, taskbar, and explorer views.
//!
//! Menus are plain data; the host renders them and executes the chosen [`MenuAction`].

use desktop_app_contract::{AppDefinition, AppRegistry};
use platform_host::{file_extension, FsEntry};

use crate::commands::{desktop_folder_entry, DesktopCommand};
use crate::config::DesktopConfig;
use crate::model::{DesktopState, InstanceId};
use crate::reducer::DesktopAction;

#[derive(Debug, Clone, PartialEq)]
/// What selecting a menu item does.
pub enum MenuAction {
    /// Nothing; used for headers and disabled placeholders.
    None,
    /// Apply an action synchronously.
    Dispatch(DesktopAction),
    /// Run an async command.
    Command(DesktopCommand),
    /// Start inline renaming of an entry in the host UI.
    BeginRename(FsEntry),
    /// Reload the listing shown by the current explorer view.
    RefreshView,
}

#[derive(Debug, Clone, PartialEq)]
/// One row of a context menu.
pub enum MenuEntry {
    /// Selectable item, optionally with a submenu.
    Item {
        /// Display label.
        label: String,
        /// Selection behavior.
        action: MenuAction,
        /// Greyed out.
        disabled: bool,
        /// Nested entries.
        children: Vec<MenuEntry>,
    },
    /// Divider line.
    Separator,
}

impl MenuEntry {
    fn item(label: impl Into<String>, action: MenuAction) -> Self {
        Self::Item {
            label: label.into(),
            action,
            disabled: false,
            children: Vec::new(),
        }
    }

    fn disabled(label: impl Into<String>) -> Self {
        Self::Item {
            label: label.into(),
            action: MenuAction::None,
            disabled: true,
            children: Vec::new(),
        }
    }

    fn command(label: impl Into<String>, command: DesktopCommand) -> Self {
        Self::item(label, MenuAction::Command(command))
    }

    fn dispatch(label: impl Into<String>, action: DesktopAction) -> Self {
        Self::item(label, MenuAction::Dispatch(action))
    }

    /// Label of an item, `None` for separators.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Item { label, .. } => Some(label),
            Self::Separator => None,
        }
    }

    /// `true` for disabled items.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Item { disabled: true, .. })
    }
}

/// Apps offered under "Open with" for `entry`; folders get none.
pub fn open_with_candidates<'a>(
    registry: &'a AppRegistry,
    entry: &FsEntry,
) -> Vec<&'a AppDefinition> {
    if entry.is_folder() {
        return Vec::new();
    }
    file_extension(&entry.name)
        .map(|ext| registry.by_extension(ext))
        .unwrap_or_default()
}

/// Menu for a right-click on a desktop item.
pub fn desktop_item_menu(registry: &AppRegistry, entry: &FsEntry) -> Vec<MenuEntry> {
    let open_with: Vec<MenuEntry> = open_with_candidates(registry, entry)
        .into_iter()
        .map(|app| {
            MenuEntry::command(
                app.name.clone(),
                DesktopCommand::OpenEntry {
                    entry: entry.clone(),
                    open_with: Some(app.id.to_string()),
                },
            )
        })
        .collect();

    vec![
        MenuEntry::command(
            "Open",
            DesktopCommand::OpenEntry {
                entry: entry.clone(),
                open_with: None,
            },
        ),
        MenuEntry::Item {
            label: "Open with".to_string(),
            action: MenuAction::None,
            disabled: open_with.is_empty(),
            children: open_with,
        },
        MenuEntry::Separator,
        MenuEntry::dispatch(
            "Copy",
            DesktopAction::CopyToClipboard {
                entry: entry.clone(),
            },
        ),
        MenuEntry::command(
            "Create shortcut",
            DesktopCommand::CreateShortcut {
                target_path: entry.path.clone(),
            },
        ),
        MenuEntry::Separator,
        MenuEntry::command(
            "Delete",
            DesktopCommand::Delete {
                path: entry.path.clone(),
            },
        ),
        MenuEntry::item("Rename", MenuAction::BeginRename(entry.clone())),
        MenuEntry::Separator,
        MenuEntry::command(
            "Properties",
            DesktopCommand::OpenProperties {
                entry: entry.clone(),
            },
        ),
    ]
}

/// Menu for a right-click on the empty desktop.
pub fn desktop_background_menu(state: &DesktopState, config: &DesktopConfig) -> Vec<MenuEntry> {
    let folder = config.desktop_folder.clone();
    let paste = MenuEntry::Item {
        label: "Paste".to_string(),
        action: MenuAction::Command(DesktopCommand::Paste {
            dest_dir: folder.clone(),
        }),
        disabled: state.clipboard.is_none(),
        children: Vec::new(),
    };

    vec![
        paste,
        MenuEntry::Separator,
        MenuEntry::command(
            "New Folder",
            DesktopCommand::NewFolder {
                parent: folder.clone(),
            },
        ),
        MenuEntry::command("New Text File", DesktopCommand::NewTextFile { parent: folder }),
        MenuEntry::Separator,
        MenuEntry::command("Refresh", DesktopCommand::RefreshDesktop),
        MenuEntry::Separator,
        MenuEntry::command(
            "Properties",
            DesktopCommand::OpenProperties {
                entry: desktop_folder_entry(config),
            },
        ),
    ]
}

/// Menu for a taskbar button. `instance_id` is the running instance behind it, if any.
pub fn taskbar_app_menu(
    state: &DesktopState,
    app: &AppDefinition,
    instance_id: Option<InstanceId>,
) -> Vec<MenuEntry> {
    let mut menu = vec![MenuEntry::disabled(app.name.clone()), MenuEntry::Separator];

    if let Some(instance) = instance_id.and_then(|id| state.instance(id)) {
        let instance_id = instance.instance_id;
        let maximize_label = if instance.is_maximized {
            "Restore"
        } else {
            "Maximize"
        };
        menu.push(MenuEntry::dispatch(
            maximize_label,
            DesktopAction::ToggleMaximize { instance_id },
        ));
        if !instance.is_minimized {
            menu.push(MenuEntry::dispatch(
                "Minimize",
                DesktopAction::ToggleMinimize { instance_id },
            ));
        }
        menu.push(MenuEntry::dispatch(
            "Close",
            DesktopAction::Close { instance_id },
        ));
        menu.push(MenuEntry::Separator);
    }

    if state.is_pinned(&app.id) {
        menu.push(MenuEntry::dispatch(
            "Unpin from taskbar",
            DesktopAction::UnpinApp {
                app_id: app.id.clone(),
            },
        ));
    } else {
        menu.push(MenuEntry::dispatch(
            "Pin to taskbar",
            DesktopAction::PinApp {
                app_id: app.id.clone(),
            },
        ));
    }
    menu
}

/// Menu for the empty taskbar area.
pub fn taskbar_background_menu() -> Vec<MenuEntry> {
    vec![MenuEntry::disabled("Taskbar settings")]
}

/// Menu for an item inside an explorer view.
pub fn explorer_item_menu(entry: &FsEntry) -> Vec<MenuEntry> {
    vec![
        MenuEntry::command(
            "Open",
            DesktopCommand::OpenEntry {
                entry: entry.clone(),
                open_with: None,
            },
        ),
        MenuEntry::Separator,
        MenuEntry::command(
            "Delete",
            DesktopCommand::Delete {
                path: entry.path.clone(),
            },
        ),
        MenuEntry::item("Rename", MenuAction::BeginRename(entry.clone())),
    ]
}

/// Menu for the empty area of an explorer view showing `current_path`.
pub fn explorer_background_menu(current_path: &str) -> Vec<MenuEntry> {
    vec![
        MenuEntry::command(
            "New Folder",
            DesktopCommand::NewFolder {
                parent: current_path.to_string(),
            },
        ),
        MenuEntry::command(
            "New Text File",
            DesktopCommand::NewTextFile {
                parent: current_path.to_string(),
            },
        ),
        MenuEntry::Separator,
        MenuEntry::item("Refresh", MenuAction::RefreshView),
    ]
}
