use std::time::Duration;

use anyhow::Result;
use hearth_core::Message;
use hearth_platform::PlatformSkill;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Message>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Dispatch messages from `input` and from the loopback channel, one at a
/// time, until `input` is exhausted and nothing has arrived for `linger`.
pub async fn run<R>(
    skill: &PlatformSkill,
    input: R,
    mut loopback: mpsc::UnboundedReceiver<Message>,
    linger: Duration,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(line) => match parse_line(&line) {
                    Ok(Some(message)) => {
                        skill.handle(&message);
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Ignoring malformed bus message: {e}"),
                },
                None => {
                    tracing::debug!("Input closed");
                    input_open = false;
                }
            },
            Some(message) = loopback.recv() => {
                skill.handle(&message);
            }
            _ = tokio::time::sleep(linger), if !input_open => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hearth_core::config::PlatformConfig;
    use hearth_platform::mock::{MockBus, MockGui};
    use hearth_platform::SettingsStore;

    #[test]
    fn parse_line_accepts_bus_messages() {
        let msg = parse_line(r#"{"type": "mycroft.awoken"}"#).unwrap().unwrap();
        assert_eq!(msg.msg_type, "mycroft.awoken");
        assert!(msg.data.is_empty());
    }

    #[test]
    fn parse_line_skips_blank_lines() {
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn parse_line_rejects_garbage() {
        assert!(parse_line("not json").is_err());
        assert!(parse_line(r#"{"data": {}}"#).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn run_dispatches_input_in_order() {
        let bus = Arc::new(MockBus::new());
        let skill = PlatformSkill::new(
            bus.clone(),
            Arc::new(MockGui::new()),
            PlatformConfig::default(),
            SettingsStore::in_memory(),
        );
        skill.initialize();

        let input: &[u8] = br#"{"type": "mycroft.mark2.register_idle", "data": {"name": "Clock", "id": "clock-skill"}}

this line is not a message
{"type": "mycroft.device.set.idle", "data": {"selected": "Clock"}}
{"type": "mycroft.device.show.idle"}
"#;
        let (_tx, rx) = mpsc::unbounded_channel();
        run(&skill, input, rx, Duration::from_secs(2)).await.unwrap();

        assert_eq!(
            bus.emitted_types(),
            vec!["mycroft.mark2.collect_idle", "clock-skill.idle", "clock-skill.idle"]
        );
    }
}
