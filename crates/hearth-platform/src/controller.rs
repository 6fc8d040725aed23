//! Idle screen scheduling and override handling.
//!
//! The controller decides when the resting screen comes back, which
//! registered screen that is, and whether another skill is holding it off.
//! Event handlers run serially on the dispatch loop. Idle firings are tokio
//! tasks and may run concurrently with them, so the timer sits behind its
//! own lock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use hearth_core::config::PlatformConfig;
use hearth_core::topics;
use hearth_core::{GuiSurface, Message, MessageBus};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::display::{neutral_visemes, DisplayState, VisemeList};
use crate::error::{PlatformError, PlatformResult};
use crate::registry::{IdleRegistry, IdleScreenRegistration};
use crate::settings::SettingsStore;
use crate::timer::IdleTimer;

/// A page that asked for the idle screen to stay away.
#[derive(Debug, Clone)]
pub struct IdleOverride {
    pub message: Message,
    pub started: Instant,
}

pub struct IdleDisplayController {
    bus: Arc<dyn MessageBus>,
    gui: Arc<dyn GuiSurface>,
    config: PlatformConfig,
    settings: Mutex<SettingsStore>,
    registry: RwLock<IdleRegistry>,
    selected: RwLock<String>,
    timer: Mutex<IdleTimer>,
    idle_override: Mutex<Option<IdleOverride>>,
    has_shown_page: AtomicBool,
    display: Mutex<DisplayState>,
    active_handlers: Mutex<HashSet<String>>,
}

impl IdleDisplayController {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        gui: Arc<dyn GuiSurface>,
        config: PlatformConfig,
        settings: SettingsStore,
    ) -> Arc<Self> {
        let selected = settings
            .settings()
            .selected
            .clone()
            .unwrap_or_else(|| config.default_idle_screen.clone());
        Arc::new(Self {
            bus,
            gui,
            config,
            settings: Mutex::new(settings),
            registry: RwLock::new(IdleRegistry::new()),
            selected: RwLock::new(selected),
            timer: Mutex::new(IdleTimer::new()),
            idle_override: Mutex::new(None),
            has_shown_page: AtomicBool::new(false),
            display: Mutex::new(DisplayState::Loading),
            active_handlers: Mutex::new(HashSet::new()),
        })
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn gui(&self) -> &Arc<dyn GuiSurface> {
        &self.gui
    }

    pub fn register_idle_screen(&self, message: &Message) -> PlatformResult<()> {
        let registration = IdleScreenRegistration::from_message(message)?;
        tracing::info!("Registered {}", registration.name);
        write(&self.registry).register(registration);
        Ok(())
    }

    /// Make `name` the idle screen. The name is not checked against the registry.
    pub fn select_idle_screen(&self, name: &str) -> PlatformResult<()> {
        *write(&self.selected) = name.to_string();
        self.gui.set("selected", json!(name));
        self.gui.set("selectedScreen", json!(name));
        tracing::debug!("Saving resting screen {name}");
        lock(&self.settings).set_selected(name)
    }

    pub fn selected_screen(&self) -> String {
        read(&self.selected).clone()
    }

    /// Registered (name, id) pairs ordered by name.
    pub fn idle_screens(&self) -> Vec<(String, String)> {
        read(&self.registry).entries()
    }

    /// Announce the selected screen to the GUI.
    pub fn publish_selection(&self) {
        let selected = self.selected_screen();
        self.gui.set("selected", json!(selected));
        self.gui.set("selectedScreen", json!(selected));
    }

    /// Show the idle screen `offset` from now unless the tracked deadline
    /// is still pending and later than that.
    ///
    /// A weak request re-arms the firing but leaves the tracked deadline
    /// untouched.
    pub fn start_idle_timer(self: &Arc<Self>, offset: Duration, weak: bool) {
        let mut timer = lock(&self.timer);
        self.arm_locked(&mut timer, offset, weak);
    }

    /// Drop whatever is pending and start a fresh strong timer, even when
    /// it is due sooner than the tracked deadline.
    pub fn restart_idle_timer(self: &Arc<Self>, offset: Duration) {
        let mut timer = lock(&self.timer);
        timer.cancel();
        self.arm_locked(&mut timer, offset, false);
    }

    pub fn cancel_idle_timer(&self) {
        lock(&self.timer).cancel();
    }

    pub fn idle_deadline(&self) -> Option<Instant> {
        lock(&self.timer).deadline()
    }

    pub fn idle_pending(&self) -> bool {
        lock(&self.timer).is_pending()
    }

    fn arm_locked(self: &Arc<Self>, timer: &mut IdleTimer, offset: Duration, weak: bool) {
        let now = Instant::now();
        let Some(requested) = now.checked_add(offset) else {
            tracing::warn!("Idle offset {offset:?} out of range, ignoring");
            return;
        };
        if timer.defers_to_existing(now, requested) {
            tracing::info!("No update, idle screen already due later");
            return;
        }

        // Firings are scheduled at whole-second resolution.
        let delay = Duration::from_secs(offset.as_secs());
        let controller = Arc::downgrade(self);
        timer.arm(requested, weak, move |generation| {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(controller) = controller.upgrade() {
                    controller.idle_timer_fired(generation);
                }
            })
        });
        tracing::info!("Showing idle screen in {:.1}s", offset.as_secs_f64());
    }

    fn idle_timer_fired(&self, generation: u64) {
        if !lock(&self.timer).fired(generation) {
            tracing::debug!("Superseded idle firing still running");
        }
        self.show_idle_screen();
    }

    /// Show the selected idle screen, or hand control back to the page that
    /// is overriding idle.
    pub fn show_idle_screen(&self) {
        tracing::debug!("Showing idle screen");
        let overriding = lock(&self.idle_override)
            .as_ref()
            .map(|o| o.message.clone());
        if let Some(message) = overriding {
            tracing::debug!("Returning to override idle screen");
            self.bus.emit(message);
            return;
        }

        let screen_id = {
            let registry = read(&self.registry);
            if registry.is_empty() {
                None
            } else {
                let selected = self.selected_screen();
                tracing::debug!("Showing idle screen for {selected}");
                registry.screen_id(&selected).map(str::to_string)
            }
        };
        if let Some(id) = screen_id {
            self.bus.emit(Message::new(topics::idle_notification(&id)));
        }
    }

    /// Return home: an override older than the grace period is dropped first.
    pub fn force_idle_screen(&self) {
        self.clear_expired_override();
        self.show_idle_screen();
    }

    /// Ask the selected screen's owner to show it, ignoring any override.
    pub fn force_home(&self) {
        let selected = self.selected_screen();
        let screen_id = read(&self.registry).screen_id(&selected).map(str::to_string);
        if let Some(id) = screen_id {
            self.bus.emit(Message::new(topics::idle_notification(&id)));
        }
    }

    pub fn override_active(&self) -> bool {
        lock(&self.idle_override).is_some()
    }

    /// Clears the override when it is older than the grace period.
    /// Returns whether it was cleared.
    fn clear_expired_override(&self) -> bool {
        let mut idle_override = lock(&self.idle_override);
        let expired = idle_override
            .as_ref()
            .is_some_and(|o| o.started.elapsed() > self.config.override_grace());
        if expired {
            tracing::info!("Clearing expired idle override");
            *idle_override = None;
        }
        expired
    }

    /// Ask other skills to (re-)register their idle screens, then show idle
    /// once they had time to answer.
    pub fn collect_resting_screens(self: &Arc<Self>) -> JoinHandle<()> {
        self.bus.emit(Message::new(topics::COLLECT_IDLE));
        let controller = Arc::downgrade(self);
        let delay = self.config.collect_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(controller) = controller.upgrade() {
                controller.show_idle_screen();
            }
        })
    }

    /// Switch from the loading face to a registered resting screen once
    /// every skill is up.
    pub fn reset_face(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::downgrade(self);
        let delay = self.config.reset_face_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(controller) = controller.upgrade() {
                if let Err(e) = controller.collect_resting_screens().await {
                    tracing::error!("Resting screen collection failed: {e}");
                }
            }
        })
    }

    pub fn on_page_shown(self: &Arc<Self>, message: &Message) -> PlatformResult<()> {
        let from = message.str_field("__from").unwrap_or_default();
        if from.contains(self.config.skill_id.as_str()) {
            return Ok(());
        }
        // Some skill other than this one is showing a page
        self.has_shown_page.store(true, Ordering::SeqCst);

        match message.get("__idle") {
            Some(Value::Bool(true)) => {
                self.cancel_idle_timer();
                *lock(&self.idle_override) = Some(IdleOverride {
                    message: message.clone(),
                    started: Instant::now(),
                });
            }
            // `false` counts as a zero second timeout.
            Some(Value::Bool(false)) => {
                tracing::info!("Overriding idle timer to 0 seconds");
                self.restart_idle_timer(Duration::ZERO);
            }
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => {
                let secs = n.as_i64().map_or(u64::MAX, |s| s.max(0) as u64);
                tracing::info!("Overriding idle timer to {secs} seconds");
                self.restart_idle_timer(Duration::from_secs(secs));
            }
            _ => {
                let first_page = message
                    .get("page")
                    .and_then(Value::as_array)
                    .and_then(|pages| pages.first())
                    .and_then(Value::as_str);
                if let Some(page) = first_page {
                    if !page.ends_with("idle.qml") {
                        self.start_idle_timer(self.config.idle_timeout(), false);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn on_page_interaction(self: &Arc<Self>) {
        tracing::info!(
            "Resetting idle counter to {} seconds",
            self.config.idle_timeout_secs
        );
        self.start_idle_timer(self.config.idle_timeout(), false);
    }

    pub fn has_shown_page(&self) -> bool {
        self.has_shown_page.load(Ordering::SeqCst)
    }

    pub fn display_state(&self) -> DisplayState {
        *lock(&self.display)
    }

    /// Render `state` through the platform page.
    pub fn show_state(&self, state: DisplayState) {
        *lock(&self.display) = state;
        self.gui.set("state", json!(state.as_str()));
        self.gui.show_page(&self.config.page);
    }

    pub fn on_listening_ended(&self) {
        self.has_shown_page.store(false, Ordering::SeqCst);
        self.show_state(DisplayState::Thinking);
    }

    pub fn on_stt_failed(&self) {
        self.show_idle_screen();
    }

    pub fn on_sleep(&self) {
        self.show_state(DisplayState::Resting);
    }

    pub fn on_awoken(&self) {
        self.show_state(DisplayState::Awake);
    }

    /// Animate speech unless a skill page owns the screen, and bring idle
    /// back once the speech is over.
    pub fn on_speaking(self: &Arc<Self>, message: &Message) -> PlatformResult<()> {
        self.gui.set("viseme", Value::Object(message.data.clone()));
        if self.has_shown_page() {
            return Ok(());
        }

        self.show_state(DisplayState::Speaking);
        let visemes: VisemeList = serde_json::from_value(Value::Object(message.data.clone()))?;
        match visemes.speech_end() {
            Some(end) => {
                let speech = Duration::try_from_secs_f64(end.max(0.0))
                    .map_err(|_| PlatformError::malformed(topics::VISEME_LIST, "visemes"))?;
                self.start_idle_timer(speech + self.config.speech_grace(), false);
            }
            None => tracing::warn!("Viseme list without cues, idle not scheduled"),
        }
        Ok(())
    }

    pub fn on_mouth_reset(&self) {
        self.gui.set("viseme", neutral_visemes());
    }

    /// Stop request: drop a stale override and quiet the avatar.
    pub fn stop(&self) {
        if self.clear_expired_override() {
            self.show_idle_screen();
        }
        self.gui.set("viseme", neutral_visemes());
    }

    fn is_ignored_handler(&self, handler: &str) -> bool {
        handler.contains(self.config.skill_name.as_str())
            || self
                .config
                .ignored_handlers
                .iter()
                .any(|ignored| handler.contains(ignored.as_str()))
    }

    pub fn on_handler_started(&self, handler: &str) {
        if self.is_ignored_handler(handler) {
            return;
        }
        tracing::debug!("Handler started: {handler}");
        lock(&self.active_handlers).insert(handler.to_string());
    }

    /// A skill finished executing: forget that it showed a page.
    pub fn on_handler_complete(&self, handler: &str) {
        if self.is_ignored_handler(handler) {
            return;
        }
        self.has_shown_page.store(false, Ordering::SeqCst);
        lock(&self.active_handlers).remove(handler);
    }

    pub fn is_busy(&self) -> bool {
        !lock(&self.active_handlers).is_empty()
    }

    /// Cancel pending work and forget any override.
    pub fn shutdown(&self) {
        self.cancel_idle_timer();
        *lock(&self.idle_override) = None;
        lock(&self.active_handlers).clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
