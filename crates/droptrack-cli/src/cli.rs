//! CLI argument definitions for droptrack.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "droptrack")]
#[command(about = "Fight, instance and loot tracker for a game stream", version)]
pub struct Args {
    /// Record store (JSON snapshot)
    #[arg(long, value_name = "FILE", env = "DROPTRACK_STORE", default_value = "droptrack.json")]
    pub store: String,

    /// Game rules file
    #[arg(long, value_name = "FILE", env = "DROPTRACK_CONFIG", default_value = "config.json")]
    pub config: String,

    /// Preferences file
    #[arg(
        long,
        value_name = "FILE",
        env = "DROPTRACK_PREFERENCES",
        default_value = "preferences.txt"
    )]
    pub preferences: String,

    /// Write raw frame logs under this directory
    #[arg(long, value_name = "DIR", env = "DROPTRACK_LOG_DIR")]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect to a TCP tap forwarding the game stream
    Listen {
        /// Tap address (HOST:PORT)
        #[arg(long, env = "DROPTRACK_ADDR")]
        addr: String,
    },
    /// Feed a raw byte dump of the stream
    Replay {
        /// Dump file
        file: String,
        /// Bytes per chunk
        #[arg(long, default_value = "4096")]
        chunk_size: usize,
    },
    /// Re-process frames from a frame log
    ReplayLog {
        /// Frame log file (packet_log.txt)
        file: String,
    },
    /// Print instance and fight summaries
    Summary {
        /// Player name (defaults to the tracked player)
        #[arg(long)]
        player: Option<String>,
        /// Only records started at or after this time (RFC 3339)
        #[arg(long)]
        since: Option<String>,
    },
    /// Export fights
    Export {
        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "tsv")]
        format: ExportFormat,
        /// Player name (defaults to the tracked player)
        #[arg(long)]
        player: Option<String>,
    },
    /// Set the tracked player name
    SetPlayer {
        name: String,
    },
    /// Turn sound signals on or off
    Sound {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Tsv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}
