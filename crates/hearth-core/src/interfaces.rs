//! Contracts between the platform skill and the host it runs inside.
//!
//! The message bus and the GUI renderer belong to the host. The skill only
//! sees them through these traits.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A message travelling over the host bus.
///
/// Serialized as `{"type": "...", "data": {...}, "context": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl Message {
    pub fn new(msg_type: impl Into<String>) -> Self {
        Self {
            msg_type: msg_type.into(),
            data: Map::new(),
            context: Map::new(),
        }
    }

    /// Build a message from a JSON object. Non-object payloads become empty data.
    pub fn with_data(msg_type: impl Into<String>, data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            msg_type: msg_type.into(),
            data,
            context: Map::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// String field of the payload, if present and a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// Publish side of the host message bus.
pub trait MessageBus: Send + Sync {
    fn emit(&self, message: Message);
}

/// Declarative page surface of the host GUI.
pub trait GuiSurface: Send + Sync {
    /// Set a session value the pages bind to.
    fn set(&self, key: &str, value: Value);
    fn show_page(&self, page: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_wire_format() {
        let raw = r#"{"type": "mycroft.mark2.register_idle", "data": {"name": "Clock", "id": "clock-skill"}}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.msg_type, "mycroft.mark2.register_idle");
        assert_eq!(msg.str_field("name"), Some("Clock"));
        assert!(msg.context.is_empty());

        let out = serde_json::to_value(&msg).unwrap();
        assert_eq!(out["type"], "mycroft.mark2.register_idle");
        assert_eq!(out["data"]["id"], "clock-skill");
    }

    #[test]
    fn with_data_ignores_non_objects() {
        let msg = Message::with_data("x", json!([1, 2, 3]));
        assert!(msg.data.is_empty());

        let msg = Message::with_data("x", json!({"selected": "Clock"}));
        assert_eq!(msg.str_field("selected"), Some("Clock"));
        assert_eq!(msg.str_field("missing"), None);
    }

    #[test]
    fn traits_are_object_safe() {
        struct Null;
        impl MessageBus for Null {
            fn emit(&self, _message: Message) {}
        }
        impl GuiSurface for Null {
            fn set(&self, _key: &str, _value: Value) {}
            fn show_page(&self, _page: &str) {}
        }
        let bus: Box<dyn MessageBus> = Box::new(Null);
        bus.emit(Message::new("ping"));
        let gui: Box<dyn GuiSurface> = Box::new(Null);
        gui.show_page("all.qml");
    }
}
