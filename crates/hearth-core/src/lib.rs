pub mod config;
pub mod interfaces;
pub mod lifecycle;
pub mod topics;

pub use config::AppConfig;
pub use interfaces::{GuiSurface, Message, MessageBus};
