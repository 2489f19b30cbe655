use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{DropEntry, FightId, InstanceId, Timestamp};

/// Kills of one opponent type in a fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentTally {
    pub name: String,
    pub level: i64,
    pub quantity: u32,
}

/// One combat encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fight {
    pub id: FightId,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    pub instance_id: Option<InstanceId>,
    /// Player whose summary was applied, if any.
    pub player_name: Option<String>,
    pub gold: i64,
    pub exp: i64,
    /// Secondary currency ("psycho") earned.
    pub psycho: i64,
    pub drops: Vec<DropEntry>,
    pub opponents: Vec<OpponentTally>,
}

impl Fight {
    pub fn new(id: FightId, start: Timestamp, instance_id: Option<InstanceId>) -> Self {
        Self {
            id,
            start,
            end: None,
            instance_id,
            player_name: None,
            gold: 0,
            exp: 0,
            psycho: 0,
            drops: Vec::new(),
            opponents: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Count one kill, collapsing repeats of the same (name, level).
    pub fn record_kill(&mut self, name: &str, level: i64) {
        match self
            .opponents
            .iter_mut()
            .find(|o| o.name == name && o.level == level)
        {
            Some(tally) => tally.quantity += 1,
            None => self.opponents.push(OpponentTally {
                name: name.to_string(),
                level,
                quantity: 1,
            }),
        }
    }

    pub fn kill_count(&self) -> u32 {
        self.opponents.iter().map(|o| o.quantity).sum()
    }

    /// Opponent names with counts, e.g. `["Rat (3)", "Boss"]`, in first-seen order.
    pub fn opponent_labels(&self) -> Vec<String> {
        let mut totals: Vec<(&str, u32)> = Vec::new();
        for tally in &self.opponents {
            match totals.iter_mut().find(|(name, _)| *name == tally.name) {
                Some((_, qty)) => *qty += tally.quantity,
                None => totals.push((&tally.name, tally.quantity)),
            }
        }
        totals
            .into_iter()
            .map(|(name, qty)| {
                if qty > 1 {
                    format!("{} ({})", name, qty)
                } else {
                    name.to_string()
                }
            })
            .collect()
    }

    pub fn duration(&self) -> Duration {
        self.end.map_or(Duration::zero(), |end| end - self.start)
    }
}
