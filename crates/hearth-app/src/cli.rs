use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hearth", about = "Hearth — resting screen platform for voice assistants")]
pub struct Cli {
    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read bus messages as JSON lines on stdin, write bus and GUI traffic to stdout
    Run {
        /// Keep running this long after stdin closes so pending idle timers can fire
        #[arg(long, default_value_t = 0)]
        linger_secs: u64,
    },

    /// Print the persisted user settings
    ShowSettings,
}
