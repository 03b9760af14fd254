//! Desktop runtime: window-instance state machine, item resolution, and async commands.

pub mod commands;
pub mod config;
pub mod context_menu;
pub mod model;
pub mod reducer;
pub mod resolver;
pub mod runtime_context;
pub mod window_manager;

pub use commands::{CommandContext, CommandError, DesktopCommand};
pub use config::{ConfigError, DesktopConfig, WindowLayoutConfig};
pub use context_menu::{MenuAction, MenuEntry};
pub use model::*;
pub use reducer::{reduce_desktop, DesktopAction, RuntimeEffect};
pub use resolver::{ItemResolver, LaunchParams, LaunchPlan, ResolveError, ResolveOutcome};
pub use runtime_context::{BootError, DesktopRuntime};
pub use window_manager::OpenInstanceRequest;
