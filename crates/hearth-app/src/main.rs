mod cli;
mod driver;
mod host;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use hearth_core::config::AppConfig;
use hearth_core::lifecycle;
use hearth_platform::{PlatformSkill, SettingsStore};
use tokio::io::BufReader;
use tokio::sync::mpsc;

use cli::{Cli, Commands};
use host::{LoopbackBus, StdoutGui};

#[tokio::main]
async fn main() -> Result<()> {
    lifecycle::init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref());

    match cli.command {
        Commands::Run { linger_secs } => {
            lifecycle::log_startup();

            let (loop_tx, loop_rx) = mpsc::unbounded_channel();
            let settings = SettingsStore::open(&config.settings.path);
            let skill = PlatformSkill::new(
                Arc::new(LoopbackBus::new(loop_tx)),
                Arc::new(StdoutGui),
                config.platform.clone(),
                settings,
            );
            skill.initialize();

            let stdin = BufReader::new(tokio::io::stdin());
            let result = driver::run(&skill, stdin, loop_rx, Duration::from_secs(linger_secs)).await;

            skill.shutdown();
            lifecycle::log_shutdown();
            result?;
        }

        Commands::ShowSettings => {
            let store = SettingsStore::open(&config.settings.path);
            println!("{}", serde_json::to_string_pretty(store.settings())?);
        }
    }

    Ok(())
}
