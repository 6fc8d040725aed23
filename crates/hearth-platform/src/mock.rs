//! Recording bus and GUI implementations for testing.

use std::sync::Mutex;

use hearth_core::{GuiSurface, Message, MessageBus};
use serde_json::Value;

/// MessageBus that keeps every emitted message.
#[derive(Debug, Default)]
pub struct MockBus {
    emitted: Mutex<Vec<Message>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<Message> {
        self.emitted.lock().unwrap().clone()
    }

    pub fn emitted_types(&self) -> Vec<String> {
        self.emitted
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.msg_type.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.emitted.lock().unwrap().clear();
    }
}

impl MessageBus for MockBus {
    fn emit(&self, message: Message) {
        self.emitted.lock().unwrap().push(message);
    }
}

/// A command received by [`MockGui`].
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    Set { key: String, value: Value },
    ShowPage(String),
}

/// GuiSurface that keeps every command.
#[derive(Debug, Default)]
pub struct MockGui {
    commands: Mutex<Vec<GuiCommand>>,
}

impl MockGui {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<GuiCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Most recent value set for `key`.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|cmd| match cmd {
                GuiCommand::Set { key: k, value } if k == key => Some(value.clone()),
                _ => None,
            })
    }

    /// Most recent `state` value as a string.
    pub fn state(&self) -> Option<String> {
        self.value("state")
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn pages_shown(&self) -> usize {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|cmd| matches!(cmd, GuiCommand::ShowPage(_)))
            .count()
    }

    pub fn clear_log(&self) {
        self.commands.lock().unwrap().clear();
    }
}

impl GuiSurface for MockGui {
    fn set(&self, key: &str, value: Value) {
        self.commands.lock().unwrap().push(GuiCommand::Set {
            key: key.to_string(),
            value,
        });
    }

    fn show_page(&self, page: &str) {
        self.commands
            .lock()
            .unwrap()
            .push(GuiCommand::ShowPage(page.to_string()));
    }
}
