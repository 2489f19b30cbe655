//! Export formats for fight statistics.

mod console;

pub use console::*;

use std::fs;
use std::path::Path;

use chrono::SecondsFormat;
use serde_json::{Value as JsonValue, json};

use crate::error::Result;
use crate::model::Timestamp;
use crate::stats::FightSummary;

pub fn format_fight_tsv_header() -> String {
    [
        "id",
        "start",
        "end",
        "duration",
        "instance",
        "opponents",
        "exp",
        "psycho",
        "gold",
        "drop_value",
        "drops",
    ]
    .join("\t")
}

pub fn format_fight_tsv_row(fight: &FightSummary) -> String {
    let duration = fight
        .end
        .map(|end| format_duration((end - fight.start).num_seconds()))
        .unwrap_or_default();

    [
        fight.id.to_string(),
        format_time(fight.start),
        fight.end.map(format_time).unwrap_or_default(),
        duration,
        tsv_field(&fight.instance_name),
        tsv_field(&fight.opponents.join(", ")),
        fight.exp.to_string(),
        fight.psycho.to_string(),
        fight.gold.to_string(),
        fight.drop_value.to_string(),
        tsv_field(&fight.drops),
    ]
    .join("\t")
}

/// TSV document with a header line and one row per fight.
pub fn generate_fights_tsv(fights: &[FightSummary]) -> String {
    let mut lines = vec![format_fight_tsv_header()];
    lines.extend(fights.iter().map(format_fight_tsv_row));
    lines.join("\n") + "\n"
}

pub fn format_fight_json(fight: &FightSummary) -> JsonValue {
    json!({
        "id": fight.id,
        "start": format_time(fight.start),
        "end": fight.end.map(format_time),
        "instanceId": fight.instance_id,
        "instance": fight.instance_name,
        "opponents": fight.opponents,
        "exp": fight.exp,
        "psycho": fight.psycho,
        "gold": fight.gold,
        "dropValue": fight.drop_value,
        "drops": fight.drops,
    })
}

pub fn generate_fights_json(fights: &[FightSummary]) -> Result<String> {
    let entries: Vec<JsonValue> = fights.iter().map(format_fight_json).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

pub fn export_fights_tsv<P: AsRef<Path>>(path: P, fights: &[FightSummary]) -> Result<()> {
    fs::write(path, generate_fights_tsv(fights))?;
    Ok(())
}

pub fn export_fights_json<P: AsRef<Path>>(path: P, fights: &[FightSummary]) -> Result<()> {
    fs::write(path, generate_fights_json(fights)?)?;
    Ok(())
}

/// `mm:ss`, or `h:mm:ss` from one hour on.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

fn format_time(time: Timestamp) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Tabs and newlines would break the row layout.
fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
