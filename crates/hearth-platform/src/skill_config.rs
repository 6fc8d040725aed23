use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use hearth_core::topics;
use hearth_core::Message;

use crate::error::{PlatformError, PlatformResult};

/// One configurable setting another skill exposes on the settings page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSettingEntry {
    pub skill_id: String,
    pub setting_key: String,
    pub setting_type: String,
    pub current_value: Value,
    pub available_values: Value,
}

/// Settings collected from `gui.skill.settings.show` messages.
#[derive(Debug, Default)]
pub struct SkillConfigBoard {
    entries: Vec<SkillSettingEntry>,
}

impl SkillConfigBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SkillSettingEntry] {
        &self.entries
    }

    /// Apply a `set` or `update` message. Unknown methods are logged and ignored.
    pub fn apply(&mut self, message: &Message) -> PlatformResult<()> {
        match message.str_field("method") {
            Some("set") => {
                let entry: SkillSettingEntry =
                    serde_json::from_value(Value::Object(message.data.clone()))?;
                self.entries.push(entry);
            }
            Some("update") => {
                let skill_id = message
                    .str_field("skill_id")
                    .ok_or_else(|| PlatformError::malformed(topics::SKILL_SETTINGS_SHOW, "skill_id"))?;
                let value = message.get("current_value").cloned().ok_or_else(|| {
                    PlatformError::malformed(topics::SKILL_SETTINGS_SHOW, "current_value")
                })?;
                // Only the first entry of a skill is updated, whatever its key.
                let entry = self
                    .entries
                    .iter_mut()
                    .find(|entry| entry.skill_id == skill_id)
                    .ok_or_else(|| PlatformError::UnknownSkill(skill_id.to_string()))?;
                entry.current_value = value;
                tracing::info!("Updated {}.{}", entry.skill_id, entry.setting_key);
            }
            _ => tracing::error!("no method defined"),
        }
        Ok(())
    }

    /// Object the settings pages bind to as `skillConfig`.
    pub fn config_object(&self) -> Value {
        json!({ "configs": self.entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_message(skill_id: &str, key: &str, value: Value) -> Message {
        Message::with_data(
            topics::SKILL_SETTINGS_SHOW,
            json!({
                "method": "set",
                "skill_id": skill_id,
                "setting_key": key,
                "setting_type": "list",
                "current_value": value,
                "available_values": ["metric", "imperial"],
            }),
        )
    }

    #[test]
    fn set_appends_entries() {
        let mut board = SkillConfigBoard::new();
        board.apply(&set_message("weather", "units", json!("metric"))).unwrap();
        board.apply(&set_message("weather", "units", json!("imperial"))).unwrap();
        assert_eq!(board.entries().len(), 2);
        assert_eq!(board.config_object()["configs"][0]["setting_key"], "units");
    }

    #[test]
    fn set_requires_every_field() {
        let mut board = SkillConfigBoard::new();
        let msg = Message::with_data(
            topics::SKILL_SETTINGS_SHOW,
            json!({"method": "set", "skill_id": "weather"}),
        );
        assert!(matches!(board.apply(&msg), Err(PlatformError::Json(_))));
        assert!(board.entries().is_empty());
    }

    #[test]
    fn update_changes_first_matching_skill() {
        let mut board = SkillConfigBoard::new();
        board.apply(&set_message("weather", "units", json!("metric"))).unwrap();
        board.apply(&set_message("weather", "city", json!("Oslo"))).unwrap();

        let update = Message::with_data(
            topics::SKILL_SETTINGS_SHOW,
            json!({"method": "update", "skill_id": "weather", "current_value": "imperial"}),
        );
        board.apply(&update).unwrap();
        assert_eq!(board.entries()[0].current_value, json!("imperial"));
        assert_eq!(board.entries()[1].current_value, json!("Oslo"));
    }

    #[test]
    fn update_unknown_skill_fails() {
        let mut board = SkillConfigBoard::new();
        let update = Message::with_data(
            topics::SKILL_SETTINGS_SHOW,
            json!({"method": "update", "skill_id": "news", "current_value": 1}),
        );
        assert!(matches!(
            board.apply(&update),
            Err(PlatformError::UnknownSkill(id)) if id == "news"
        ));
    }

    #[test]
    fn unknown_method_is_ignored() {
        let mut board = SkillConfigBoard::new();
        let msg = Message::with_data(topics::SKILL_SETTINGS_SHOW, json!({"method": "delete"}));
        board.apply(&msg).unwrap();
        assert!(board.entries().is_empty());
    }
}
