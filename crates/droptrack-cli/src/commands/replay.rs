//! Offline replay of captured streams and frame logs.

use std::fs;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use droptrack_core::read_frame_log;

use crate::cli_utils::{self, Paths};

/// Feed a raw byte dump in chunks of `chunk_size`.
pub fn run(paths: &Paths, file: &str, chunk_size: usize) -> Result<()> {
    if chunk_size == 0 {
        bail!("chunk size must be positive");
    }
    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file))?;
    let mut session = cli_utils::open_session(paths, false)?;

    let mut frames = 0;
    for chunk in bytes.chunks(chunk_size) {
        frames += session.feed(chunk, Utc::now())?;
    }

    let counters = session.counters();
    eprintln!(
        "Replayed {} frames from {} ({} unknown, {} malformed, {} faults)",
        frames, file, counters.unknown, counters.malformed, counters.faults
    );
    cli_utils::save_store(&session, paths)
}

/// Replay a frame log with its recorded times.
pub fn run_log(paths: &Paths, file: &str) -> Result<()> {
    let frames = read_frame_log(file).with_context(|| format!("failed to read {}", file))?;
    let mut session = cli_utils::open_session(paths, false)?;

    for frame in &frames {
        session.replay(frame);
    }

    let counters = session.counters();
    eprintln!(
        "Replayed {} logged frames from {} ({} faults)",
        frames.len(),
        file,
        counters.faults
    );
    cli_utils::save_store(&session, paths)
}
