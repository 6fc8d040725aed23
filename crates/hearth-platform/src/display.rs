use std::fmt;

use serde::Deserialize;
use serde_json::{json, Value};

/// Which device settings page is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsPage {
    Main,
    Homescreen,
    UpdateDevice,
    SkillConfig,
}

/// Visual state rendered by the platform page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Loading,
    Thinking,
    Speaking,
    Resting,
    Awake,
    Settings(SettingsPage),
}

impl DisplayState {
    /// Value the page binds to as `state`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayState::Loading => "loading",
            DisplayState::Thinking => "thinking",
            DisplayState::Speaking => "speaking",
            DisplayState::Resting => "resting",
            DisplayState::Awake => "awake",
            DisplayState::Settings(SettingsPage::Main) => "settings/settingspage",
            DisplayState::Settings(SettingsPage::Homescreen) => "settings/homescreen_settings",
            DisplayState::Settings(SettingsPage::UpdateDevice) => {
                "settings/updatedevice_settings"
            }
            DisplayState::Settings(SettingsPage::SkillConfig) => "settings/skill_settings",
        }
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mouth-shape cues for one utterance: `[code, end_seconds]` pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct VisemeList {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub visemes: Vec<(Value, f64)>,
}

impl VisemeList {
    /// End time of the last cue, relative to the start of speech.
    pub fn speech_end(&self) -> Option<f64> {
        self.visemes.last().map(|(_, end)| *end)
    }
}

/// Viseme payload that leaves the avatar at rest.
pub fn neutral_visemes() -> Value {
    json!({"start": 0, "visemes": []})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_states_use_page_paths() {
        assert_eq!(
            DisplayState::Settings(SettingsPage::Homescreen).as_str(),
            "settings/homescreen_settings"
        );
        assert_eq!(DisplayState::Thinking.to_string(), "thinking");
    }

    #[test]
    fn speech_end_is_last_cue() {
        let list: VisemeList = serde_json::from_value(json!({
            "start": 1700000000.0,
            "visemes": [["4", 0.2], [0, 0.45], ["2", 1.75]]
        }))
        .unwrap();
        assert_eq!(list.speech_end(), Some(1.75));
    }

    #[test]
    fn empty_viseme_list_has_no_end() {
        let list: VisemeList = serde_json::from_value(json!({})).unwrap();
        assert_eq!(list.speech_end(), None);
        assert_eq!(list.start, 0.0);
    }
}
