//! CLI argument parsing tests.
//!
//! These tests verify that command-line arguments are parsed correctly
//! without actually executing the commands (which would need a stream tap).

use clap::Parser;

// Re-create Args structure for testing since it's not publicly exported
#[derive(Parser)]
#[command(name = "droptrack")]
struct Args {
    #[arg(long, value_name = "FILE", default_value = "droptrack.json")]
    store: String,

    #[arg(long, value_name = "FILE", default_value = "config.json")]
    config: String,

    #[arg(long, value_name = "FILE", default_value = "preferences.txt")]
    preferences: String,

    #[arg(long, value_name = "DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    Listen {
        #[arg(long)]
        addr: String,
    },
    Replay {
        file: String,
        #[arg(long, default_value = "4096")]
        chunk_size: usize,
    },
    ReplayLog {
        file: String,
    },
    Summary {
        #[arg(long)]
        player: Option<String>,
        #[arg(long)]
        since: Option<String>,
    },
    Export {
        #[arg(short, long)]
        output: Option<String>,
        #[arg(short, long, value_enum, default_value = "tsv")]
        format: ExportFormat,
        #[arg(long)]
        player: Option<String>,
    },
    SetPlayer {
        name: String,
    },
    Sound {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Debug, Clone, PartialEq, clap::ValueEnum)]
enum ExportFormat {
    Tsv,
    Json,
}

#[derive(Debug, Clone, PartialEq, clap::ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[test]
fn test_command_is_required() {
    assert!(Args::try_parse_from(["droptrack"]).is_err());
}

#[test]
fn test_global_defaults() {
    let args = Args::try_parse_from(["droptrack", "replay-log", "packet_log.txt"]).unwrap();
    assert_eq!(args.store, "droptrack.json");
    assert_eq!(args.config, "config.json");
    assert_eq!(args.preferences, "preferences.txt");
    assert!(args.log_dir.is_none());
}

#[test]
fn test_parse_listen() {
    let args = Args::try_parse_from([
        "droptrack",
        "--log-dir",
        "logs",
        "listen",
        "--addr",
        "127.0.0.1:7000",
    ])
    .unwrap();
    assert_eq!(args.log_dir.as_deref(), Some("logs"));
    match args.command {
        Command::Listen { addr } => assert_eq!(addr, "127.0.0.1:7000"),
        _ => panic!("Expected Listen command"),
    }
}

#[test]
fn test_listen_requires_addr() {
    assert!(Args::try_parse_from(["droptrack", "listen"]).is_err());
}

#[test]
fn test_parse_replay_chunk_size() {
    let args = Args::try_parse_from(["droptrack", "replay", "dump.bin"]).unwrap();
    match args.command {
        Command::Replay { file, chunk_size } => {
            assert_eq!(file, "dump.bin");
            assert_eq!(chunk_size, 4096);
        }
        _ => panic!("Expected Replay command"),
    }

    let args =
        Args::try_parse_from(["droptrack", "replay", "dump.bin", "--chunk-size", "7"]).unwrap();
    match args.command {
        Command::Replay { chunk_size, .. } => assert_eq!(chunk_size, 7),
        _ => panic!("Expected Replay command"),
    }
}

#[test]
fn test_parse_summary() {
    let args = Args::try_parse_from([
        "droptrack",
        "summary",
        "--player",
        "Hero",
        "--since",
        "2025-03-01T00:00:00Z",
    ])
    .unwrap();
    match args.command {
        Command::Summary { player, since } => {
            assert_eq!(player.as_deref(), Some("Hero"));
            assert_eq!(since.as_deref(), Some("2025-03-01T00:00:00Z"));
        }
        _ => panic!("Expected Summary command"),
    }
}

#[test]
fn test_parse_export_formats() {
    let args = Args::try_parse_from(["droptrack", "export"]).unwrap();
    match args.command {
        Command::Export { output, format, .. } => {
            assert!(output.is_none());
            assert_eq!(format, ExportFormat::Tsv);
        }
        _ => panic!("Expected Export command"),
    }

    let args =
        Args::try_parse_from(["droptrack", "export", "-f", "json", "-o", "fights.json"]).unwrap();
    match args.command {
        Command::Export { output, format, .. } => {
            assert_eq!(output.as_deref(), Some("fights.json"));
            assert_eq!(format, ExportFormat::Json);
        }
        _ => panic!("Expected Export command"),
    }
}

#[test]
fn test_invalid_export_format() {
    assert!(Args::try_parse_from(["droptrack", "export", "--format", "xml"]).is_err());
}

#[test]
fn test_parse_preference_commands() {
    let args = Args::try_parse_from(["droptrack", "set-player", "Hero"]).unwrap();
    assert!(matches!(args.command, Command::SetPlayer { name } if name == "Hero"));

    let args = Args::try_parse_from(["droptrack", "sound", "off"]).unwrap();
    assert!(matches!(args.command, Command::Sound { state: Toggle::Off }));

    assert!(Args::try_parse_from(["droptrack", "sound", "loud"]).is_err());
}
