use std::sync::{Arc, Mutex, PoisonError, RwLock};

use hearth_core::config::PlatformConfig;
use hearth_core::topics;
use hearth_core::{GuiSurface, Message, MessageBus};
use serde_json::{json, Value};

use crate::controller::IdleDisplayController;
use crate::display::{neutral_visemes, DisplayState, SettingsPage};
use crate::error::{PlatformError, PlatformResult};
use crate::router::EventRouter;
use crate::settings::SettingsStore;
use crate::skill_config::SkillConfigBoard;

/// The platform skill: routes bus events to the idle controller and renders
/// the device settings pages.
pub struct PlatformSkill {
    controller: Arc<IdleDisplayController>,
    gui: Arc<dyn GuiSurface>,
    skill_config: Mutex<SkillConfigBoard>,
    router: RwLock<EventRouter<PlatformSkill>>,
}

impl PlatformSkill {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        gui: Arc<dyn GuiSurface>,
        config: PlatformConfig,
        settings: SettingsStore,
    ) -> Self {
        let controller = IdleDisplayController::new(bus, gui.clone(), config, settings);
        Self {
            controller,
            gui,
            skill_config: Mutex::new(SkillConfigBoard::new()),
            router: RwLock::new(EventRouter::new()),
        }
    }

    pub fn controller(&self) -> &Arc<IdleDisplayController> {
        &self.controller
    }

    /// Register handlers, show the loading face and start collecting idle
    /// screens. Must run inside a tokio runtime.
    pub fn initialize(&self) {
        self.gui.set("viseme", neutral_visemes());
        self.controller.publish_selection();

        let registered = {
            let mut router = self.router.write().unwrap_or_else(PoisonError::into_inner);
            Self::register_handlers(&mut router);
            router.len()
        };
        tracing::info!("Registered {registered} platform handlers");

        // Loading face while the remaining skills start.
        self.controller.show_state(DisplayState::Loading);
        self.controller.collect_resting_screens();
    }

    /// Unregister every handler and drop pending idle work.
    pub fn shutdown(&self) {
        self.router
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.controller.shutdown();
    }

    /// Dispatch one bus message. Returns whether a handler was registered for it.
    pub fn handle(&self, message: &Message) -> bool {
        // Handlers never touch the router, so the read lock is held throughout.
        self.router
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dispatch(self, message)
    }

    pub fn is_registered(&self, topic: &str) -> bool {
        self.router
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_registered(topic)
    }

    fn register_handlers(router: &mut EventRouter<PlatformSkill>) {
        // Idle screen discovery and selection
        router.on(topics::REGISTER_IDLE, Self::register_idle);
        router.on(topics::DEVICE_SET_IDLE, Self::set_idle);
        router.on(topics::DEVICE_SHOW_IDLE, Self::show_idle);
        router.on(topics::SCREEN_CLOSE, Self::force_idle);
        router.on(topics::HOMESCREEN_INTENT, Self::force_idle);
        router.on(topics::FORCE_HOME, Self::force_home);
        router.on(topics::SKILLS_INITIALIZED, Self::skills_initialized);
        router.on(topics::STOP, Self::stop);

        // Pages
        router.on(topics::PAGE_SHOW, Self::page_shown);
        router.on(topics::PAGE_INTERACTION, Self::page_interaction);

        // Listening, speaking, sleeping
        router.on(topics::RECORD_END, Self::listening_ended);
        router.on(topics::STT_UNKNOWN, Self::stt_failed);
        router.on(topics::SLEEP, Self::sleep);
        router.on(topics::AWOKEN, Self::awoken);
        router.on(topics::MOUTH_RESET, Self::mouth_reset);
        router.on(topics::AUDIO_OUTPUT_END, Self::mouth_reset);
        router.on(topics::VISEME_LIST, Self::speaking);

        // Skill handlers
        router.on(topics::HANDLER_START, Self::handler_started);
        router.on(topics::HANDLER_COMPLETE, Self::handler_complete);

        // Device settings
        router.on(topics::DEVICE_SETTINGS, Self::device_settings);
        router.on(topics::DEVICE_SETTINGS_INTENT, Self::device_settings);
        router.on(topics::DEVICE_HOMESCREEN_SETTINGS, Self::homescreen_settings);
        router.on(
            topics::DEVICE_HOMESCREEN_SETTINGS_INTENT,
            Self::homescreen_settings,
        );
        router.on(topics::DEVICE_UPDATE_SETTINGS, Self::update_settings);
        router.on(topics::DEVICE_SKILL_SETTINGS, Self::skill_settings_page);
        router.on(topics::SKILL_SETTINGS_SHOW, Self::skill_setting_show);
    }

    fn register_idle(&self, message: &Message) -> PlatformResult<()> {
        self.controller.register_idle_screen(message)
    }

    fn set_idle(&self, message: &Message) -> PlatformResult<()> {
        let selected = message
            .str_field("selected")
            .ok_or_else(|| PlatformError::malformed(topics::DEVICE_SET_IDLE, "selected"))?;
        self.controller.select_idle_screen(selected)
    }

    fn show_idle(&self, _message: &Message) -> PlatformResult<()> {
        self.controller.show_idle_screen();
        Ok(())
    }

    fn force_idle(&self, _message: &Message) -> PlatformResult<()> {
        tracing::debug!("Returning to the idle screen");
        self.controller.force_idle_screen();
        Ok(())
    }

    fn force_home(&self, _message: &Message) -> PlatformResult<()> {
        self.controller.force_home();
        Ok(())
    }

    fn skills_initialized(&self, _message: &Message) -> PlatformResult<()> {
        self.controller.reset_face();
        Ok(())
    }

    fn stop(&self, _message: &Message) -> PlatformResult<()> {
        self.controller.stop();
        Ok(())
    }

    fn page_shown(&self, message: &Message) -> PlatformResult<()> {
        self.controller.on_page_shown(message)
    }

    fn page_interaction(&self, _message: &Message) -> PlatformResult<()> {
        self.controller.on_page_interaction();
        Ok(())
    }

    fn listening_ended(&self, _message: &Message) -> PlatformResult<()> {
        self.controller.on_listening_ended();
        Ok(())
    }

    fn stt_failed(&self, _message: &Message) -> PlatformResult<()> {
        self.controller.on_stt_failed();
        Ok(())
    }

    fn sleep(&self, _message: &Message) -> PlatformResult<()> {
        self.controller.on_sleep();
        Ok(())
    }

    fn awoken(&self, _message: &Message) -> PlatformResult<()> {
        self.controller.on_awoken();
        Ok(())
    }

    fn mouth_reset(&self, _message: &Message) -> PlatformResult<()> {
        self.controller.on_mouth_reset();
        Ok(())
    }

    fn speaking(&self, message: &Message) -> PlatformResult<()> {
        self.controller.on_speaking(message)
    }

    fn handler_started(&self, message: &Message) -> PlatformResult<()> {
        self.controller
            .on_handler_started(message.str_field("handler").unwrap_or_default());
        Ok(())
    }

    fn handler_complete(&self, message: &Message) -> PlatformResult<()> {
        self.controller
            .on_handler_complete(message.str_field("handler").unwrap_or_default());
        Ok(())
    }

    fn skill_config_object(&self) -> Value {
        self.skill_config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .config_object()
    }

    fn device_settings(&self, _message: &Message) -> PlatformResult<()> {
        self.gui.set("skillConfig", self.skill_config_object());
        self.controller
            .show_state(DisplayState::Settings(SettingsPage::Main));
        Ok(())
    }

    fn homescreen_settings(&self, _message: &Message) -> PlatformResult<()> {
        let screens: Vec<Value> = self
            .controller
            .idle_screens()
            .into_iter()
            .map(|(name, id)| json!({"screenName": name, "screenID": id}))
            .collect();
        self.gui
            .set("idleScreenList", json!({ "screenBlob": screens }));
        self.gui
            .set("selectedScreen", json!(self.controller.selected_screen()));
        self.controller
            .show_state(DisplayState::Settings(SettingsPage::Homescreen));
        Ok(())
    }

    fn update_settings(&self, _message: &Message) -> PlatformResult<()> {
        self.controller
            .show_state(DisplayState::Settings(SettingsPage::UpdateDevice));
        Ok(())
    }

    fn skill_settings_page(&self, _message: &Message) -> PlatformResult<()> {
        self.gui.set("skillConfig", self.skill_config_object());
        self.controller
            .show_state(DisplayState::Settings(SettingsPage::SkillConfig));
        Ok(())
    }

    fn skill_setting_show(&self, message: &Message) -> PlatformResult<()> {
        let config = {
            let mut board = self
                .skill_config
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            board.apply(message)?;
            board.config_object()
        };
        // Published serialized here, as an object by the settings pages.
        self.gui.set("skillConfig", Value::String(config.to_string()));
        Ok(())
    }
}
