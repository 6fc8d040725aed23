use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlatformResult;

/// User preferences kept across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSettings {
    /// Name of the chosen idle screen.
    #[serde(default)]
    pub selected: Option<String>,
    #[serde(default)]
    pub auto_brightness: bool,
    #[serde(default = "default_use_listening_beep")]
    pub use_listening_beep: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_use_listening_beep() -> bool {
    true
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            selected: None,
            auto_brightness: false,
            use_listening_beep: default_use_listening_beep(),
            updated_at: None,
        }
    }
}

/// JSON-file backed settings. A store without a path keeps settings in memory only.
#[derive(Debug)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    settings: PlatformSettings,
}

impl SettingsStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            settings: PlatformSettings::default(),
        }
    }

    /// Open the store at `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = if path.exists() {
            match Self::load(&path) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Failed to load settings from {}: {e}", path.display());
                    PlatformSettings::default()
                }
            }
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            PlatformSettings::default()
        };
        Self {
            path: Some(path),
            settings,
        }
    }

    pub fn load(path: &Path) -> PlatformResult<PlatformSettings> {
        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn settings(&self) -> &PlatformSettings {
        &self.settings
    }

    /// Record the chosen idle screen and write it out.
    pub fn set_selected(&mut self, name: &str) -> PlatformResult<()> {
        self.settings.selected = Some(name.to_string());
        self.settings.updated_at = Some(Utc::now());
        self.save()
    }

    pub fn save(&self) -> PlatformResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
