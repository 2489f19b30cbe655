mod cli;
mod cli_utils;
mod commands;
mod shutdown;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("droptrack=info,droptrack_core=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let paths = cli_utils::Paths::from_args(&args);
    match args.command {
        Command::Listen { addr } => commands::listen::run(&paths, &addr),
        Command::Replay { file, chunk_size } => commands::replay::run(&paths, &file, chunk_size),
        Command::ReplayLog { file } => commands::replay::run_log(&paths, &file),
        Command::Summary { player, since } => {
            commands::summary::run(&paths, player.as_deref(), since.as_deref())
        }
        Command::Export {
            output,
            format,
            player,
        } => commands::export::run(&paths, output.as_deref(), format, player.as_deref()),
        Command::SetPlayer { name } => commands::preferences::set_player(&paths, &name),
        Command::Sound { state } => commands::preferences::set_sound(&paths, state),
    }
}
