use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Behaviour of the resting-screen platform skill.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Identifier the GUI stamps into `__from` for pages this skill shows.
    #[serde(default = "default_skill_id")]
    pub skill_id: String,
    /// Name that appears in handler names this skill runs.
    #[serde(default = "default_skill_name")]
    pub skill_name: String,
    /// Idle screen selected when the user never picked one.
    #[serde(default = "default_idle_screen")]
    pub default_idle_screen: String,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Extra time after the last viseme before idle comes back.
    #[serde(default = "default_speech_grace_secs")]
    pub speech_grace_secs: u64,
    /// Age after which an idle override may be cleared by a forced return home.
    #[serde(default = "default_override_grace_secs")]
    pub override_grace_secs: u64,
    #[serde(default = "default_collect_delay_ms")]
    pub collect_delay_ms: u64,
    #[serde(default = "default_reset_face_delay_ms")]
    pub reset_face_delay_ms: u64,
    /// Page every display state is rendered through.
    #[serde(default = "default_page")]
    pub page: String,
    /// Handlers that never count as user-facing activity.
    #[serde(default = "default_ignored_handlers")]
    pub ignored_handlers: Vec<String>,
}

fn default_skill_id() -> String {
    "hearth-platform".into()
}
fn default_skill_name() -> String {
    "HearthPlatform".into()
}
fn default_idle_screen() -> String {
    "homescreen".into()
}
fn default_idle_timeout_secs() -> u64 {
    30
}
fn default_speech_grace_secs() -> u64 {
    5
}
fn default_override_grace_secs() -> u64 {
    2
}
fn default_collect_delay_ms() -> u64 {
    1000
}
fn default_reset_face_delay_ms() -> u64 {
    1000
}
fn default_page() -> String {
    "all.qml".into()
}
fn default_ignored_handlers() -> Vec<String> {
    vec!["TimeSkill.update_display".into()]
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            skill_id: default_skill_id(),
            skill_name: default_skill_name(),
            default_idle_screen: default_idle_screen(),
            idle_timeout_secs: default_idle_timeout_secs(),
            speech_grace_secs: default_speech_grace_secs(),
            override_grace_secs: default_override_grace_secs(),
            collect_delay_ms: default_collect_delay_ms(),
            reset_face_delay_ms: default_reset_face_delay_ms(),
            page: default_page(),
            ignored_handlers: default_ignored_handlers(),
        }
    }
}

impl PlatformConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn speech_grace(&self) -> Duration {
        Duration::from_secs(self.speech_grace_secs)
    }

    pub fn override_grace(&self) -> Duration {
        Duration::from_secs(self.override_grace_secs)
    }

    pub fn collect_delay(&self) -> Duration {
        Duration::from_millis(self.collect_delay_ms)
    }

    pub fn reset_face_delay(&self) -> Duration {
        Duration::from_millis(self.reset_face_delay_ms)
    }
}

/// Where user preferences are persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_settings_path")]
    pub path: String,
}

fn default_settings_path() -> String {
    "data/platform-settings.json".into()
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback chain: explicit path → ./config/default.toml → hardcoded defaults.
    pub fn load_or_default(explicit_path: Option<&Path>) -> Self {
        if let Some(path) = explicit_path {
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {e}", path.display());
                }
            }
        }

        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            match Self::load(default_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!("Failed to load default config: {e}");
                }
            }
        }

        tracing::info!("Using hardcoded default configuration");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_config_defaults() {
        let cfg = PlatformConfig::default();
        assert_eq!(cfg.idle_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.speech_grace(), Duration::from_secs(5));
        assert_eq!(cfg.override_grace(), Duration::from_secs(2));
        assert_eq!(cfg.page, "all.qml");
        assert_eq!(cfg.ignored_handlers, vec!["TimeSkill.update_display"]);
    }

    #[test]
    fn deserialize_partial_platform_section() {
        let toml = r#"
            [platform]
            skill_id = "kitchen-display"
            idle_timeout_secs = 45

            [settings]
            path = "/tmp/hearth.json"
        "#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.platform.skill_id, "kitchen-display");
        assert_eq!(cfg.platform.idle_timeout_secs, 45);
        assert_eq!(cfg.platform.default_idle_screen, "homescreen");
        assert_eq!(cfg.settings.path, "/tmp/hearth.json");
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.platform.collect_delay(), Duration::from_millis(1000));
        assert_eq!(cfg.settings.path, "data/platform-settings.json");
    }

    #[test]
    fn missing_explicit_path_falls_back() {
        let cfg = AppConfig::load_or_default(Some(Path::new("/nonexistent/hearth.toml")));
        assert_eq!(cfg.platform.skill_name, "HearthPlatform");
    }
}
