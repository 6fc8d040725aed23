use std::collections::HashMap;

use hearth_core::topics;
use hearth_core::Message;
use serde_json::Value;

use crate::error::{PlatformError, PlatformResult};

/// An idle screen advertised by another skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleScreenRegistration {
    pub name: String,
    pub id: String,
}

impl IdleScreenRegistration {
    /// Parse a `register_idle` message. Both `name` and `id` are required.
    /// `name` must be a string; a numeric `id` is used in its decimal form.
    pub fn from_message(message: &Message) -> PlatformResult<Self> {
        let name = message
            .str_field("name")
            .ok_or_else(|| PlatformError::malformed(topics::REGISTER_IDLE, "name"))?;
        let id = match message.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(PlatformError::malformed(topics::REGISTER_IDLE, "id")),
        };
        Ok(Self {
            name: name.to_string(),
            id,
        })
    }
}

/// Screen name → screen id. Later registrations of a name replace earlier ones.
#[derive(Debug, Default)]
pub struct IdleRegistry {
    screens: HashMap<String, String>,
}

impl IdleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id previously registered under this name, if any.
    pub fn register(&mut self, registration: IdleScreenRegistration) -> Option<String> {
        self.screens.insert(registration.name, registration.id)
    }

    pub fn screen_id(&self, name: &str) -> Option<&str> {
        self.screens.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    /// (name, id) pairs ordered by name, for stable settings listings.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .screens
            .iter()
            .map(|(name, id)| (name.clone(), id.clone()))
            .collect();
        entries.sort();
        entries
    }
}
