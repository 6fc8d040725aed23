//! Stdio stand-ins for the host bus and GUI.
//!
//! Everything the skill emits is written to stdout as one JSON object per
//! line. Bus messages are also looped back so the skill sees its own
//! traffic, as it would on a shared bus.

use std::io::Write;

use hearth_core::{GuiSurface, Message, MessageBus};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum OutputLine<'a> {
    Bus(&'a Message),
    Gui(GuiOutput<'a>),
}

#[derive(Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum GuiOutput<'a> {
    Set { key: &'a str, value: &'a Value },
    ShowPage { page: &'a str },
}

fn write_line(line: &OutputLine<'_>) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let written = serde_json::to_writer(&mut out, line)
        .map_err(std::io::Error::from)
        .and_then(|_| writeln!(out))
        .and_then(|_| out.flush());
    if let Err(e) = written {
        tracing::warn!("Failed to write output: {e}");
    }
}

/// Bus that prints emitted messages and feeds them back to the dispatcher.
pub struct LoopbackBus {
    tx: mpsc::UnboundedSender<Message>,
}

impl LoopbackBus {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }
}

impl MessageBus for LoopbackBus {
    fn emit(&self, message: Message) {
        write_line(&OutputLine::Bus(&message));
        if self.tx.send(message).is_err() {
            tracing::debug!("Dispatcher gone, message not looped back");
        }
    }
}

/// GUI that prints every command.
pub struct StdoutGui;

impl GuiSurface for StdoutGui {
    fn set(&self, key: &str, value: Value) {
        write_line(&OutputLine::Gui(GuiOutput::Set { key, value: &value }));
    }

    fn show_page(&self, page: &str) {
        write_line(&OutputLine::Gui(GuiOutput::ShowPage { page }));
    }
}
