//! Console summary of recorded instances and fights.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use droptrack_core::export::{
    format_drop_details, format_fight_line, format_instance_console, format_totals_console,
};
use droptrack_core::{DropDetail, MemoryRepository, Stats, Timestamp};

use crate::cli_utils::{self, Paths};

/// Print the player's instances with their fights, then fights outside instances.
pub fn run(paths: &Paths, player: Option<&str>, since: Option<&str>) -> Result<()> {
    let preferences = cli_utils::load_preferences(paths)?;
    let player = player.unwrap_or(preferences.player_name());
    let from = parse_since(since)?;
    let now = Utc::now();

    let repo = MemoryRepository::load_or_default(&paths.store);
    let stats = Stats::new(&repo);

    let instances = stats.instances(player, from, now, now)?;
    if instances.is_empty() {
        println!("No instances for {}", player);
    }
    for instance in instances.iter().rev() {
        println!("{}", format_instance_console(instance));
        for fight in stats.fights_in_instance(player, instance.id)?.iter().rev() {
            println!("  {}", format_fight_line(fight));
        }
    }

    let loose = stats.fights(player, from, now, true)?;
    if !loose.is_empty() {
        let ids: Vec<_> = loose.iter().map(|f| f.id).collect();
        println!();
        let totals = stats.totals(player, &ids)?;
        println!("{}", format_totals_console("Fights outside instances", &totals));
    }

    if let Some(totals) = stats.last_fight_totals(player)? {
        println!();
        println!("{}", format_totals_console("Last fight", &totals));
        print_drops(&stats.last_fight_drop_details(player)?);
    }

    if let Some(instance) = stats.current_or_last_instance_summary(player, now)? {
        println!();
        println!("Drops in {}:", instance.name);
        print_drops(&stats.current_or_last_instance_drop_details(player)?);
    }
    Ok(())
}

fn print_drops(details: &[DropDetail]) {
    if !details.is_empty() {
        println!("{}", format_drop_details(details));
    }
}

/// Start of the reporting window; everything when omitted.
pub fn parse_since(since: Option<&str>) -> Result<Timestamp> {
    match since {
        Some(text) => Ok(DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("invalid --since time {:?}", text))?
            .with_timezone(&Utc)),
        None => Ok(DateTime::<Utc>::MIN_UTC),
    }
}
