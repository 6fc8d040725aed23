pub mod controller;
pub mod display;
pub mod error;
pub mod registry;
pub mod router;
pub mod settings;
pub mod skill;
pub mod skill_config;
pub mod timer;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use controller::IdleDisplayController;
pub use display::{DisplayState, SettingsPage};
pub use error::{PlatformError, PlatformResult};
pub use registry::IdleRegistry;
pub use settings::{PlatformSettings, SettingsStore};
pub use skill::PlatformSkill;
