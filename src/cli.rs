use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::defaults::Defaults;

/// Storefront navigation harness: script replay + canned demo
#[derive(Parser, Debug)]
#[command(version, about = "Storefront navigation harness")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a JSON navigation script against a fresh controller
    Replay {
        /// Path to the script JSON (roles, seed catalog, steps)
        #[arg(long, default_value = Defaults::REPLAY_INPUT_PATH)]
        script: PathBuf,

        /// Path to write the trace JSON (pretty-printed)
        #[arg(long, default_value = Defaults::REPLAY_TRACE_PATH)]
        out: PathBuf,
    },

    /// Walk through the push/pop/confirm/cancel cycle on a canned script
    Demo,
}
