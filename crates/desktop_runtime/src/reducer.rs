//! Reducer actions, side-effect intents, and transition logic for the desktop runtime.

use desktop_app_contract::{AppLaunchTarget, ApplicationId, WindowSize};
use platform_host::FsEntry;
use serde_json::Value;
use tracing::debug;

use crate::config::WindowLayoutConfig;
use crate::model::{ClipboardOperation, ClipboardSlot, DesktopState, InstanceId, WindowPosition};
use crate::window_manager::{self, OpenInstanceRequest};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`] to mutate [`DesktopState`].
pub enum DesktopAction {
    /// Open a new instance.
    OpenInstance(OpenInstanceRequest),
    /// Raise and activate an instance.
    Focus {
        /// Target instance.
        instance_id: InstanceId,
    },
    /// Enter or leave the maximized state.
    ToggleMaximize {
        /// Target instance.
        instance_id: InstanceId,
    },
    /// Minimize or un-minimize without changing focus.
    ToggleMinimize {
        /// Target instance.
        instance_id: InstanceId,
    },
    /// Close an instance.
    Close {
        /// Target instance.
        instance_id: InstanceId,
    },
    /// Taskbar button press (restore, minimize, or focus).
    ActivateFromTaskbar {
        /// Instance behind the taskbar button.
        instance_id: InstanceId,
    },
    /// Move an instance.
    MoveTo {
        /// Target instance.
        instance_id: InstanceId,
        /// New top-left corner.
        position: WindowPosition,
    },
    /// Resize an instance.
    Resize {
        /// Target instance.
        instance_id: InstanceId,
        /// Requested size.
        size: WindowSize,
    },
    /// Replace an instance title.
    SetTitle {
        /// Target instance.
        instance_id: InstanceId,
        /// New title.
        title: String,
    },
    /// Pin an app to the taskbar.
    PinApp {
        /// App to pin.
        app_id: ApplicationId,
    },
    /// Unpin an app from the taskbar.
    UnpinApp {
        /// App to unpin.
        app_id: ApplicationId,
    },
    /// Place an entry in the clipboard slot.
    CopyToClipboard {
        /// Copied entry.
        entry: FsEntry,
    },
    /// Empty the clipboard slot.
    ClearClipboard,
    /// Replace the desktop listing.
    SetDesktopItems {
        /// Fresh listing of the desktop folder.
        items: Vec<FsEntry>,
    },
    /// Toggle the start menu open/closed.
    ToggleStartMenu,
    /// Close the start menu if open.
    CloseStartMenu,
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_desktop`] for the host to execute.
pub enum RuntimeEffect {
    /// Move keyboard focus into the newly active instance.
    FocusInstanceInput(InstanceId),
    /// Start the out-of-process handler backing an external instance.
    LaunchExternal {
        /// Instance the handler belongs to.
        instance_id: InstanceId,
        /// Catalog id of the app.
        app_id: ApplicationId,
        /// Handler entry point.
        path: String,
        /// Instance parameters.
        initial_data: Value,
    },
    /// An instance was removed; host resources attached to it can be released.
    InstanceClosed(InstanceId),
}

/// Applies a [`DesktopAction`] to the desktop state and collects resulting side effects.
///
/// Every action is total: actions naming a missing instance leave the state unchanged.
pub fn reduce_desktop(
    state: &mut DesktopState,
    layout: &WindowLayoutConfig,
    action: DesktopAction,
) -> Vec<RuntimeEffect> {
    let mut effects = Vec::new();
    match action {
        DesktopAction::OpenInstance(request) => {
            let external = match &request.definition.launch {
                AppLaunchTarget::External { path } => Some(path.clone()),
                AppLaunchTarget::Internal => None,
            };
            let instance_id = window_manager::open_instance(state, layout, request);
            state.start_menu_open = false;
            if let (Some(path), Some(instance)) = (external, state.instance(instance_id)) {
                effects.push(RuntimeEffect::LaunchExternal {
                    instance_id,
                    app_id: instance.app_id.clone(),
                    path,
                    initial_data: instance.initial_data.clone(),
                });
            }
            effects.push(RuntimeEffect::FocusInstanceInput(instance_id));
            debug!(%instance_id, "opened instance");
        }
        DesktopAction::Focus { instance_id } => {
            if window_manager::focus_instance(state, instance_id) {
                state.start_menu_open = false;
                effects.push(RuntimeEffect::FocusInstanceInput(instance_id));
            }
        }
        DesktopAction::ToggleMaximize { instance_id } => {
            window_manager::toggle_maximize(state, instance_id, layout.viewport);
        }
        DesktopAction::ToggleMinimize { instance_id } => {
            window_manager::toggle_minimize(state, instance_id);
        }
        DesktopAction::Close { instance_id } => {
            if window_manager::close_instance(state, instance_id) {
                effects.push(RuntimeEffect::InstanceClosed(instance_id));
                debug!(%instance_id, "closed instance");
            }
        }
        DesktopAction::ActivateFromTaskbar { instance_id } => {
            if window_manager::activate_from_taskbar(state, instance_id)
                && state.active_instance_id == Some(instance_id)
            {
                effects.push(RuntimeEffect::FocusInstanceInput(instance_id));
            }
        }
        DesktopAction::MoveTo {
            instance_id,
            position,
        } => {
            window_manager::move_instance(state, instance_id, position);
        }
        DesktopAction::Resize { instance_id, size } => {
            window_manager::resize_instance(state, instance_id, size);
        }
        DesktopAction::SetTitle { instance_id, title } => {
            window_manager::set_title(state, instance_id, title);
        }
        DesktopAction::PinApp { app_id } => {
            window_manager::pin_app(state, app_id);
        }
        DesktopAction::UnpinApp { app_id } => {
            window_manager::unpin_app(state, &app_id);
        }
        DesktopAction::CopyToClipboard { entry } => {
            state.clipboard = Some(ClipboardSlot {
                entry,
                operation: ClipboardOperation::Copy,
            });
        }
        DesktopAction::ClearClipboard => {
            state.clipboard = None;
        }
        DesktopAction::SetDesktopItems { items } => {
            state.desktop_items = items;
        }
        DesktopAction::ToggleStartMenu => {
            state.start_menu_open = !state.start_menu_open;
        }
        DesktopAction::CloseStartMenu => {
            state.start_menu_open = false;
        }
    }
    effects
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use desktop_app_contract::{AppDefinition, AppRegistry};
    use platform_host::FsEntryKind;

    fn definition(id: &str) -> AppDefinition {
        AppRegistry::builtin()
            .expect("builtin catalog")
            .by_id(id)
            .cloned()
            .expect("known app")
    }

    fn open(state: &mut DesktopState, layout: &WindowLayoutConfig, id: &str) -> InstanceId {
        let expected = state.peek_next_instance_id();
        let effects = reduce_desktop(
            state,
            layout,
            DesktopAction::OpenInstance(OpenInstanceRequest::new(definition(id), json!({}))),
        );
        assert!(effects.contains(&RuntimeEffect::FocusInstanceInput(expected)));
        expected
    }

    #[test]
    fn open_instance_closes_the_start_menu_and_activates() {
        let layout = WindowLayoutConfig::default();
        let mut state = DesktopState::default();
        reduce_desktop(&mut state, &layout, DesktopAction::ToggleStartMenu);
        assert!(state.start_menu_open);

        let id = open(&mut state, &layout, "notebook");
        assert!(!state.start_menu_open);
        assert_eq!(state.active_instance_id, Some(id));
        let instance = state.instance(id).expect("instance");
        assert_eq!(instance.title, "Notebook");
        assert_eq!(instance.size, WindowSize { width: 640, height: 480 });
    }

    #[test]
    fn external_apps_emit_a_launch_effect() {
        let layout = WindowLayoutConfig::default();
        let mut state = DesktopState::default();
        let effects = reduce_desktop(
            &mut state,
            &layout,
            DesktopAction::OpenInstance(OpenInstanceRequest::new(
                definition("simple-node-app"),
                json!({ "port": 3000 }),
            )),
        );

        assert_eq!(
            effects[0],
            RuntimeEffect::LaunchExternal {
                instance_id: InstanceId(1),
                app_id: ApplicationId::trusted("simple-node-app"),
                path: "apps/simple-node-app/main.js".to_string(),
                initial_data: json!({ "port": 3000 }),
            }
        );
        assert_eq!(state.instances.len(), 1);
    }

    #[test]
    fn closing_the_active_instance_reassigns_to_the_higher_z_index() {
        let layout = WindowLayoutConfig::default();
        let mut state = DesktopState::default();
        let a = open(&mut state, &layout, "notebook");
        let b = open(&mut state, &layout, "fileExplorer");
        let c = open(&mut state, &layout, "notebook");
        reduce_desktop(&mut state, &layout, DesktopAction::Focus { instance_id: a });

        let effects = reduce_desktop(&mut state, &layout, DesktopAction::Close { instance_id: a });
        assert_eq!(effects, vec![RuntimeEffect::InstanceClosed(a)]);
        assert_eq!(state.active_instance_id, Some(c));
        assert!(state.instance(b).is_some());
    }

    #[test]
    fn late_updates_for_closed_instances_are_ignored() {
        let layout = WindowLayoutConfig::default();
        let mut state = DesktopState::default();
        let id = open(&mut state, &layout, "notebook");
        reduce_desktop(&mut state, &layout, DesktopAction::Close { instance_id: id });
        let before = state.clone();

        for action in [
            DesktopAction::SetTitle {
                instance_id: id,
                title: "late".to_string(),
            },
            DesktopAction::Focus { instance_id: id },
            DesktopAction::ToggleMaximize { instance_id: id },
            DesktopAction::Close { instance_id: id },
        ] {
            assert!(reduce_desktop(&mut state, &layout, action).is_empty());
        }
        assert_eq!(state, before);
    }

    #[test]
    fn clipboard_holds_a_single_entry() {
        let layout = WindowLayoutConfig::default();
        let mut state = DesktopState::default();
        let first = FsEntry::new("a.txt", "/Desktop/a.txt", FsEntryKind::File);
        let second = FsEntry::new("b", "/Desktop/b", FsEntryKind::Folder);

        reduce_desktop(
            &mut state,
            &layout,
            DesktopAction::CopyToClipboard { entry: first },
        );
        reduce_desktop(
            &mut state,
            &layout,
            DesktopAction::CopyToClipboard {
                entry: second.clone(),
            },
        );
        assert_eq!(
            state.clipboard,
            Some(ClipboardSlot {
                entry: second,
                operation: ClipboardOperation::Copy,
            })
        );

        reduce_desktop(&mut state, &layout, DesktopAction::ClearClipboard);
        assert_eq!(state.clipboard, None);
    }

    #[test]
    fn maximize_uses_the_configured_viewport() {
        let layout = WindowLayoutConfig::default();
        let mut state = DesktopState::default();
        let id = open(&mut state, &layout, "notebook");

        reduce_desktop(
            &mut state,
            &layout,
            DesktopAction::ToggleMaximize { instance_id: id },
        );
        let instance = state.instance(id).expect("instance");
        assert!(instance.is_maximized);
        assert_eq!(instance.bounds(), layout.viewport);
    }
}
