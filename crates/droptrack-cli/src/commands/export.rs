//! Export command for recorded fights.

use anyhow::Result;
use chrono::{DateTime, Utc};
use droptrack_core::export::{
    export_fights_json, export_fights_tsv, generate_fights_json, generate_fights_tsv,
};
use droptrack_core::{MemoryRepository, Stats};

use crate::cli::ExportFormat;
use crate::cli_utils::{self, Paths};

/// Export every fight of the player
pub fn run(
    paths: &Paths,
    output: Option<&str>,
    format: ExportFormat,
    player: Option<&str>,
) -> Result<()> {
    let preferences = cli_utils::load_preferences(paths)?;
    let player = player.unwrap_or(preferences.player_name());

    let repo = MemoryRepository::load_or_default(&paths.store);
    let fights = Stats::new(&repo).fights(
        player,
        DateTime::<Utc>::MIN_UTC,
        DateTime::<Utc>::MAX_UTC,
        false,
    )?;
    eprintln!("Exporting {} fights of {}", fights.len(), player);

    if let Some(output_path) = output {
        match format {
            ExportFormat::Tsv => export_fights_tsv(output_path, &fights)?,
            ExportFormat::Json => export_fights_json(output_path, &fights)?,
        }
        eprintln!("Exported to: {}", output_path);
    } else {
        let content = match format {
            ExportFormat::Tsv => generate_fights_tsv(&fights),
            ExportFormat::Json => generate_fights_json(&fights)?,
        };
        println!("{}", content);
    }

    Ok(())
}
