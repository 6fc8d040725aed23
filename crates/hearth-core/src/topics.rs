//! Bus message types the platform skill listens for or emits.

// Idle screen discovery
pub const REGISTER_IDLE: &str = "mycroft.mark2.register_idle";
pub const COLLECT_IDLE: &str = "mycroft.mark2.collect_idle";

// Page lifecycle
pub const PAGE_SHOW: &str = "gui.page.show";
pub const PAGE_INTERACTION: &str = "gui.page_interaction";
pub const SCREEN_CLOSE: &str = "mycroft.gui.screen.close";
pub const FORCE_HOME: &str = "mycroft.gui.forceHome";

// Listening and speech
pub const RECORD_END: &str = "recognizer_loop:record_end";
pub const STT_UNKNOWN: &str = "mycroft.speech.recognition.unknown";
pub const SLEEP: &str = "recognizer_loop:sleep";
pub const AWOKEN: &str = "mycroft.awoken";
pub const MOUTH_RESET: &str = "enclosure.mouth.reset";
pub const AUDIO_OUTPUT_END: &str = "recognizer_loop:audio_output_end";
pub const VISEME_LIST: &str = "enclosure.mouth.viseme_list";

// Skill execution
pub const HANDLER_START: &str = "mycroft.skill.handler.start";
pub const HANDLER_COMPLETE: &str = "mycroft.skill.handler.complete";
pub const SKILLS_INITIALIZED: &str = "mycroft.skills.initialized";
pub const STOP: &str = "mycroft.stop";

// Device settings
pub const DEVICE_SETTINGS: &str = "mycroft.device.settings";
pub const DEVICE_HOMESCREEN_SETTINGS: &str = "mycroft.device.settings.homescreen";
pub const DEVICE_UPDATE_SETTINGS: &str = "mycroft.device.settings.update";
pub const DEVICE_SKILL_SETTINGS: &str = "mycroft.device.settings.skillconfig";
pub const DEVICE_SHOW_IDLE: &str = "mycroft.device.show.idle";
pub const DEVICE_SET_IDLE: &str = "mycroft.device.set.idle";
pub const SKILL_SETTINGS_SHOW: &str = "gui.skill.settings.show";

// Intents
pub const HOMESCREEN_INTENT: &str = "homescreen.intent";
pub const DEVICE_SETTINGS_INTENT: &str = "device.settings.intent";
pub const DEVICE_HOMESCREEN_SETTINGS_INTENT: &str = "device.homescreen.settings.intent";

/// Notification asking the owner of an idle screen to display it.
pub fn idle_notification(screen_id: &str) -> String {
    format!("{screen_id}.idle")
}
