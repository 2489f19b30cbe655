//! Preference updates.

use anyhow::Result;

use crate::cli::Toggle;
use crate::cli_utils::{self, Paths};

pub fn set_player(paths: &Paths, name: &str) -> Result<()> {
    let mut preferences = cli_utils::load_preferences(paths)?;
    preferences.set_player_name(name.trim());
    preferences.save()?;
    println!("Tracking player: {}", preferences.player_name());
    Ok(())
}

pub fn set_sound(paths: &Paths, state: Toggle) -> Result<()> {
    let mut preferences = cli_utils::load_preferences(paths)?;
    preferences.set_sound_signals(state == Toggle::On);
    preferences.save()?;
    println!(
        "Sound signals {}",
        if preferences.sound_signals() { "on" } else { "off" }
    );
    Ok(())
}
