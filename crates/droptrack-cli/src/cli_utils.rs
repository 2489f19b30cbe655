//! Shared helpers for commands that open the record store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use droptrack_core::{
    FrameLog, GameConfig, LifecycleEvent, MemoryRepository, Preferences, Session, TerminalBell,
};
use droptrack_core::events::FnSink;
use tracing::info;

use crate::cli::Args;

/// File locations resolved from the global flags.
#[derive(Debug, Clone)]
pub struct Paths {
    pub store: PathBuf,
    pub config: PathBuf,
    pub preferences: PathBuf,
    pub log_dir: Option<PathBuf>,
}

impl Paths {
    pub fn from_args(args: &Args) -> Self {
        Self {
            store: PathBuf::from(&args.store),
            config: PathBuf::from(&args.config),
            preferences: PathBuf::from(&args.preferences),
            log_dir: args.log_dir.as_ref().map(PathBuf::from),
        }
    }
}

pub fn load_preferences(paths: &Paths) -> Result<Preferences> {
    Preferences::load(&paths.preferences)
        .with_context(|| format!("failed to read preferences {:?}", paths.preferences))
}

/// Open a session over the stored records, with console notifications.
pub fn open_session(paths: &Paths, frame_log: bool) -> Result<Session<MemoryRepository>> {
    let repo = MemoryRepository::load_or_default(&paths.store);
    let config = GameConfig::load_or_default(&paths.config);
    let preferences = load_preferences(paths)?;
    info!("Tracking player {}", preferences.player_name());

    let mut session = Session::new(repo, config, preferences)?.with_audio(TerminalBell);
    session.subscribe(FnSink(print_event));

    if frame_log && let Some(dir) = &paths.log_dir {
        let mut log = FrameLog::new(dir);
        let session_dir = log.start_session()?;
        info!("Frame log: {}", session_dir.display());
        session = session.with_frame_log(log);
    }
    Ok(session)
}

pub fn save_store(session: &Session<MemoryRepository>, paths: &Paths) -> Result<()> {
    session
        .repo()
        .save(&paths.store)
        .with_context(|| format!("failed to save store {:?}", paths.store))?;
    info!("Saved records to {}", paths.store.display());
    Ok(())
}

fn print_event(event: &LifecycleEvent) {
    match event {
        LifecycleEvent::InstanceStarted { instance_id, name } => {
            println!("Instance #{} started: {}", instance_id, name)
        }
        LifecycleEvent::InstanceEnded { instance_id } => {
            println!("Instance #{} finished", instance_id)
        }
        LifecycleEvent::FightEnded { fight_id } => println!("Fight #{} ended", fight_id),
        LifecycleEvent::PlayerDied { fight_id } => println!("Died in fight #{}", fight_id),
        LifecycleEvent::FightStarted { .. } | LifecycleEvent::FightSummaryApplied { .. } => {}
    }
}
