use desktop_app_contract::{AppLaunchTarget, ApplicationId, WindowSize};
use platform_host::FsEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "instance-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

impl WindowPosition {
    pub fn offset(self, step: WindowPosition, times: i32) -> Self {
        Self {
            x: self.x + step.x * times,
            y: self.y + step.y * times,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub position: WindowPosition,
    pub size: WindowSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInstance {
    pub instance_id: InstanceId,
    pub app_id: ApplicationId,
    pub title: String,
    pub icon: String,
    pub position: WindowPosition,
    pub size: WindowSize,
    pub z_index: u64,
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub pre_maximize_bounds: Option<WindowBounds>,
    /// 0-based slot in the cascade sequence used to place the next instance.
    pub cascade_slot: u32,
    pub initial_data: Value,
    pub launch: AppLaunchTarget,
}

impl WindowInstance {
    pub fn bounds(&self) -> WindowBounds {
        WindowBounds {
            position: self.position,
            size: self.size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipboardOperation {
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardSlot {
    pub entry: FsEntry,
    pub operation: ClipboardOperation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopState {
    pub next_instance_id: u64,
    pub next_z_index: u64,
    /// Open instances in open order; stacking lives in `z_index`.
    pub instances: Vec<WindowInstance>,
    pub active_instance_id: Option<InstanceId>,
    pub pinned_apps: Vec<ApplicationId>,
    pub clipboard: Option<ClipboardSlot>,
    pub desktop_items: Vec<FsEntry>,
    pub start_menu_open: bool,
}

impl Default for DesktopState {
    fn default() -> Self {
        Self {
            next_instance_id: 1,
            next_z_index: 1,
            instances: Vec::new(),
            active_instance_id: None,
            pinned_apps: Vec::new(),
            clipboard: None,
            desktop_items: Vec::new(),
            start_menu_open: false,
        }
    }
}

impl DesktopState {
    /// Creates empty state with `pinned_apps` seeded in order, skipping duplicates.
    pub fn with_pinned_apps(pinned_apps: impl IntoIterator<Item = ApplicationId>) -> Self {
        let mut state = Self::default();
        for app_id in pinned_apps {
            if !state.pinned_apps.contains(&app_id) {
                state.pinned_apps.push(app_id);
            }
        }
        state
    }

    pub fn instance(&self, instance_id: InstanceId) -> Option<&WindowInstance> {
        self.instances
            .iter()
            .find(|instance| instance.instance_id == instance_id)
    }

    pub fn instance_mut(&mut self, instance_id: InstanceId) -> Option<&mut WindowInstance> {
        self.instances
            .iter_mut()
            .find(|instance| instance.instance_id == instance_id)
    }

    pub fn active_instance(&self) -> Option<&WindowInstance> {
        self.active_instance_id.and_then(|id| self.instance(id))
    }

    /// Id the next `open` will assign.
    pub fn peek_next_instance_id(&self) -> InstanceId {
        InstanceId(self.next_instance_id)
    }

    /// Instances sorted back-to-front.
    pub fn stacking_order(&self) -> Vec<&WindowInstance> {
        let mut ordered: Vec<&WindowInstance> = self.instances.iter().collect();
        ordered.sort_by_key(|instance| instance.z_index);
        ordered
    }

    pub fn is_pinned(&self, app_id: &ApplicationId) -> bool {
        self.pinned_apps.contains(app_id)
    }

    pub fn instances_of<'a>(
        &'a self,
        app_id: &'a ApplicationId,
    ) -> impl Iterator<Item = &'a WindowInstance> + 'a {
        self.instances
            .iter()
            .filter(move |instance| &instance.app_id == app_id)
    }
}
