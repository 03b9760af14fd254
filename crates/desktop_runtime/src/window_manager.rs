//! Window-instance transition helpers used by the desktop reducer.
//!
//! Every helper is total: an unknown [`InstanceId`] leaves the state untouched and reports
//! `false`. Stacking uses a monotonically increasing `next_z_index` counter, so issued z values
//! are never reused.

use desktop_app_contract::{AppDefinition, ApplicationId, WindowSize};
use serde_json::Value;

use crate::config::WindowLayoutConfig;
use crate::model::{DesktopState, InstanceId, WindowBounds, WindowInstance, WindowPosition};

/// Minimum allowed managed window width.
pub const MIN_WINDOW_WIDTH: i32 = 220;
/// Minimum allowed managed window height.
pub const MIN_WINDOW_HEIGHT: i32 = 140;

/// Launch request consumed by [`open_instance`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenInstanceRequest {
    /// Definition to launch, already overlaid with any bundle overrides.
    pub definition: AppDefinition,
    /// Window title; defaults to the definition name.
    pub title: Option<String>,
    /// Fixed position; defaults to the cascade slot.
    pub position: Option<WindowPosition>,
    /// Parameters handed to the launched instance.
    pub initial_data: Value,
}

impl OpenInstanceRequest {
    /// Creates a request using the definition defaults.
    pub fn new(definition: AppDefinition, initial_data: Value) -> Self {
        Self {
            definition,
            title: None,
            position: None,
            initial_data,
        }
    }

    /// Overrides the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Overrides the initial position.
    pub fn at(mut self, position: WindowPosition) -> Self {
        self.position = Some(position);
        self
    }
}

/// Clamps `size` to the managed-window minimum.
pub fn clamp_size(size: WindowSize) -> WindowSize {
    WindowSize {
        width: size.width.max(MIN_WINDOW_WIDTH),
        height: size.height.max(MIN_WINDOW_HEIGHT),
    }
}

fn issue_z_index(state: &mut DesktopState) -> u64 {
    let z_index = state.next_z_index;
    state.next_z_index += 1;
    z_index
}

fn next_cascade_slot(state: &DesktopState, layout: &WindowLayoutConfig) -> u32 {
    let wrap = layout.cascade_wrap.max(1);
    state
        .instances
        .last()
        .map(|previous| (previous.cascade_slot + 1) % wrap)
        .unwrap_or(0)
}

/// Inserts a new active instance on top of the stack and returns its id.
pub fn open_instance(
    state: &mut DesktopState,
    layout: &WindowLayoutConfig,
    request: OpenInstanceRequest,
) -> InstanceId {
    let instance_id = InstanceId(state.next_instance_id);
    state.next_instance_id += 1;

    let cascade_slot = next_cascade_slot(state, layout);
    let position = request.position.unwrap_or_else(|| {
        layout
            .default_position
            .offset(layout.cascade_step, cascade_slot as i32)
    });
    let z_index = issue_z_index(state);
    let definition = request.definition;

    state.instances.push(WindowInstance {
        instance_id,
        title: request.title.unwrap_or_else(|| definition.name.clone()),
        app_id: definition.id,
        icon: definition.icon,
        position,
        size: clamp_size(definition.default_size),
        z_index,
        is_minimized: false,
        is_maximized: false,
        pre_maximize_bounds: None,
        cascade_slot,
        initial_data: request.initial_data,
        launch: definition.launch,
    });
    state.active_instance_id = Some(instance_id);
    instance_id
}

/// Raises and activates `instance_id`, clearing its minimized flag.
///
/// Returns `true` when stack or focus state changed.
pub fn focus_instance(state: &mut DesktopState, instance_id: InstanceId) -> bool {
    let already_active = state.active_instance_id == Some(instance_id);
    let z_index = state.next_z_index;
    let Some(instance) = state.instance_mut(instance_id) else {
        return false;
    };
    if already_active && !instance.is_minimized {
        return false;
    }
    instance.is_minimized = false;
    instance.z_index = z_index;
    state.next_z_index += 1;
    state.active_instance_id = Some(instance_id);
    true
}

/// Activates the remaining instance with the highest z-index, or nothing.
///
/// With `skip_minimized`, minimized instances are not candidates.
pub fn reassign_active(state: &mut DesktopState, skip_minimized: bool) {
    state.active_instance_id = state
        .instances
        .iter()
        .filter(|instance| !(skip_minimized && instance.is_minimized))
        .max_by_key(|instance| instance.z_index)
        .map(|instance| instance.instance_id);
}

/// Flips maximize; entering stores the current bounds and fills `viewport`.
pub fn toggle_maximize(
    state: &mut DesktopState,
    instance_id: InstanceId,
    viewport: WindowBounds,
) -> bool {
    let Some(instance) = state.instance_mut(instance_id) else {
        return false;
    };
    if instance.is_maximized {
        if let Some(bounds) = instance.pre_maximize_bounds.take() {
            instance.position = bounds.position;
            instance.size = bounds.size;
        }
        instance.is_maximized = false;
    } else {
        instance.pre_maximize_bounds = Some(instance.bounds());
        instance.position = viewport.position;
        instance.size = clamp_size(viewport.size);
        instance.is_maximized = true;
    }
    true
}

/// Flips minimize. Un-minimizing never activates; minimizing the active instance reassigns focus.
pub fn toggle_minimize(state: &mut DesktopState, instance_id: InstanceId) -> bool {
    let Some(instance) = state.instance_mut(instance_id) else {
        return false;
    };
    instance.is_minimized = !instance.is_minimized;
    let minimized = instance.is_minimized;
    if minimized && state.active_instance_id == Some(instance_id) {
        reassign_active(state, true);
    }
    true
}

/// Removes `instance_id`, reassigning focus when it was active.
pub fn close_instance(state: &mut DesktopState, instance_id: InstanceId) -> bool {
    let before = state.instances.len();
    state
        .instances
        .retain(|instance| instance.instance_id != instance_id);
    if state.instances.len() == before {
        return false;
    }
    if state.active_instance_id == Some(instance_id) {
        reassign_active(state, false);
    }
    true
}

/// Taskbar button behavior: restore a minimized instance, minimize the active one, else focus.
pub fn activate_from_taskbar(state: &mut DesktopState, instance_id: InstanceId) -> bool {
    let Some(instance) = state.instance(instance_id) else {
        return false;
    };
    if instance.is_minimized {
        return focus_instance(state, instance_id);
    }
    if state.active_instance_id == Some(instance_id) {
        return toggle_minimize(state, instance_id);
    }
    focus_instance(state, instance_id)
}

/// Moves a non-maximized instance.
pub fn move_instance(
    state: &mut DesktopState,
    instance_id: InstanceId,
    position: WindowPosition,
) -> bool {
    match state.instance_mut(instance_id) {
        Some(instance) if !instance.is_maximized => {
            instance.position = position;
            true
        }
        _ => false,
    }
}

/// Resizes a non-maximized instance, clamped to the minimum size.
pub fn resize_instance(
    state: &mut DesktopState,
    instance_id: InstanceId,
    size: WindowSize,
) -> bool {
    match state.instance_mut(instance_id) {
        Some(instance) if !instance.is_maximized => {
            instance.size = clamp_size(size);
            true
        }
        _ => false,
    }
}

/// Replaces an instance title.
pub fn set_title(state: &mut DesktopState, instance_id: InstanceId, title: String) -> bool {
    match state.instance_mut(instance_id) {
        Some(instance) if instance.title != title => {
            instance.title = title;
            true
        }
        _ => false,
    }
}

/// Appends `app_id` to the pinned list unless already present.
pub fn pin_app(state: &mut DesktopState, app_id: ApplicationId) -> bool {
    if state.is_pinned(&app_id) {
        return false;
    }
    state.pinned_apps.push(app_id);
    true
}

/// Removes `app_id` from the pinned list.
pub fn unpin_app(state: &mut DesktopState, app_id: &ApplicationId) -> bool {
    let before = state.pinned_apps.len();
    state.pinned_apps.retain(|pinned| pinned != app_id);
    state.pinned_apps.len() != before
}
