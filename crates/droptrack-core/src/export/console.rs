//! Console output formatting with colored display

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use super::format_duration;
use crate::stats::{DropDetail, FightSummary, InstanceSummary, Totals};

/// `1234567` -> `1 234 567`
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Boxed block with an instance's totals.
pub fn format_instance_console(instance: &InstanceSummary) -> String {
    let mut output = String::new();
    let border = "━".repeat(50);
    let status = if instance.end.is_some() {
        "finished".green().to_string()
    } else {
        "in progress".yellow().to_string()
    };

    let _ = writeln!(output, "{}", border.dimmed());
    let _ = writeln!(
        output,
        "  {} [difficulty {}] {}",
        instance.name.bold(),
        instance.difficulty,
        status
    );
    let _ = writeln!(output, "{}", border.dimmed());
    let _ = writeln!(
        output,
        "  TIME   : {}",
        format_duration(instance.duration_secs)
    );
    write_totals(&mut output, &instance.totals);
    let _ = write!(output, "{}", border.dimmed());
    output
}

/// Totals block under a heading.
pub fn format_totals_console(label: &str, totals: &Totals) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", label.bold());
    write_totals(&mut output, totals);
    output.trim_end().to_string()
}

fn write_totals(output: &mut String, totals: &Totals) {
    let _ = writeln!(output, "  FIGHTS : {}", totals.fight_count);
    let _ = writeln!(output, "  EXP    : {}", format_number(totals.exp).cyan());
    let _ = writeln!(output, "  PSYCHO : {}", format_number(totals.psycho).magenta());
    let _ = writeln!(output, "  GOLD   : {}", format_number(totals.gold).yellow());
    let _ = writeln!(output, "  DROPS  : {}", format_number(totals.drop_value).green());
}

/// One-line fight summary.
pub fn format_fight_line(fight: &FightSummary) -> String {
    let time = fight.start.format("%H:%M:%S").to_string();
    let opponents = if fight.opponents.is_empty() {
        "-".to_string()
    } else {
        fight.opponents.join(", ")
    };
    format!(
        "{} {} exp {} gold {} drops {}",
        time.dimmed(),
        opponents,
        format_number(fight.exp).cyan(),
        format_number(fight.gold).yellow(),
        format_number(fight.drop_value).green()
    )
}

/// Table of grouped drops, most valuable groups first.
pub fn format_drop_details(details: &[DropDetail]) -> String {
    let mut sorted: Vec<&DropDetail> = details.iter().collect();
    sorted.sort_by_key(|d| std::cmp::Reverse(d.unit_price * d.quantity));

    let mut output = String::new();
    for detail in sorted {
        let _ = writeln!(
            output,
            "  {:<32} {:<10} {:>5} x {:>10} = {}",
            detail.name,
            detail.category.dimmed(),
            detail.quantity,
            format_number(detail.unit_price),
            format_number(detail.unit_price * detail.quantity).green()
        );
    }
    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1 000");
        assert_eq!(format_number(1234567), "1 234 567");
        assert_eq!(format_number(-45000), "-45 000");
    }

    #[test]
    fn test_instance_console_contains_totals() {
        let summary = InstanceSummary {
            id: 1,
            name: "Crypt".into(),
            difficulty: 2,
            start: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            end: None,
            duration_secs: 125,
            totals: Totals {
                exp: 1500,
                psycho: 3,
                gold: 40,
                drop_value: 12000,
                fight_count: 4,
            },
        };
        let output = format_instance_console(&summary);
        assert!(output.contains("Crypt"));
        assert!(output.contains("02:05"));
        assert!(output.contains("12 000"));
        assert!(output.contains("FIGHTS : 4"));
    }

    #[test]
    fn test_drop_details_sorted_by_total() {
        let details = vec![
            DropDetail {
                name: "Bone".into(),
                category: "Item",
                quantity: 10,
                unit_price: 1,
            },
            DropDetail {
                name: "Sword".into(),
                category: "Equipment",
                quantity: 1,
                unit_price: 300,
            },
        ];
        let output = format_drop_details(&details);
        let first = output.lines().next().unwrap();
        assert!(first.contains("Sword"));
        assert_eq!(output.lines().count(), 2);
    }
}
