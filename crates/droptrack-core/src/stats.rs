//! Statistics over recorded fights and instances.
//!
//! Plain items and drifs carry no value of their own; they are priced here
//! from the current catalogs. Equipment and orbs keep the value computed
//! when they were parsed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::model::{DropEntry, DropKind, Fight, FightId, Instance, InstanceId, Timestamp};
use crate::storage::Repository;

/// Totals of a set of fights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub exp: i64,
    pub psycho: i64,
    pub gold: i64,
    pub drop_value: i64,
    pub fight_count: usize,
}

impl Totals {
    fn add(&mut self, fight: &Fight, drop_value: i64) {
        self.exp += fight.exp;
        self.psycho += fight.psycho;
        self.gold += fight.gold;
        self.drop_value += drop_value;
        self.fight_count += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSummary {
    pub id: InstanceId,
    pub name: String,
    pub difficulty: i64,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    /// Elapsed seconds, measured to "now" for an open instance.
    pub duration_secs: i64,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FightSummary {
    pub id: FightId,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    pub instance_id: Option<InstanceId>,
    pub instance_name: String,
    pub opponents: Vec<String>,
    pub exp: i64,
    pub psycho: i64,
    pub gold: i64,
    pub drop_value: i64,
    /// Drop names, e.g. `Bone (3), Sword`.
    pub drops: String,
}

/// Drops grouped by display name, category and unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropDetail {
    pub name: String,
    pub category: &'static str,
    pub quantity: i64,
    pub unit_price: i64,
}

/// Read-only statistics queries over a repository.
pub struct Stats<'a> {
    repo: &'a dyn Repository,
}

impl<'a> Stats<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    /// Price of one unit of a drop; catalog misses price at 0.
    pub fn unit_price(&self, drop: &DropEntry) -> Result<i64> {
        if let Some(value) = drop.value {
            return Ok(value);
        }
        let price = match drop.kind {
            DropKind::Item => self.repo.item_price(&drop.name)?.map(|p| p.value),
            DropKind::Drif | DropKind::Orb => {
                self.repo.artifact_price_by_name(&drop.name)?.map(|p| p.value)
            }
            DropKind::Equipment => None,
        };
        Ok(price.unwrap_or(0))
    }

    pub fn drop_value(&self, drop: &DropEntry) -> Result<i64> {
        Ok(self.unit_price(drop)? * drop.quantity)
    }

    pub fn fight_value(&self, fight: &Fight) -> Result<i64> {
        fight
            .drops
            .iter()
            .map(|drop| self.drop_value(drop))
            .sum()
    }

    /// Instances started within `[from, to]` with the player's totals, newest first.
    pub fn instances(
        &self,
        player: &str,
        from: Timestamp,
        to: Timestamp,
        now: Timestamp,
    ) -> Result<Vec<InstanceSummary>> {
        self.repo
            .instances_between(from, to)?
            .into_iter()
            .map(|instance| self.summarize_instance(&instance, player, now))
            .collect()
    }

    /// Fights of the player started at or after `from` and finished by `to`, newest first.
    pub fn fights(
        &self,
        player: &str,
        from: Timestamp,
        to: Timestamp,
        only_without_instance: bool,
    ) -> Result<Vec<FightSummary>> {
        let fights = self
            .repo
            .fights_between(from, to)?
            .into_iter()
            .filter(|f| played_by(f, player))
            .filter(|f| f.end.is_none_or(|end| end <= to))
            .filter(|f| !only_without_instance || f.instance_id.is_none());
        fights.map(|fight| self.summarize_fight(&fight)).collect()
    }

    pub fn fights_in_instance(&self, player: &str, id: InstanceId) -> Result<Vec<FightSummary>> {
        self.repo
            .fights_in_instance(id)?
            .iter()
            .filter(|f| played_by(f, player))
            .map(|fight| self.summarize_fight(fight))
            .collect()
    }

    pub fn totals(&self, player: &str, fight_ids: &[FightId]) -> Result<Totals> {
        let mut totals = Totals::default();
        for fight in self.player_fights(player, fight_ids)? {
            totals.add(&fight, self.fight_value(&fight)?);
        }
        Ok(totals)
    }

    /// Drops of the given fights grouped by name, category and unit price, in first-seen order.
    pub fn drop_details(&self, player: &str, fight_ids: &[FightId]) -> Result<Vec<DropDetail>> {
        let mut details: Vec<DropDetail> = Vec::new();
        for fight in self.player_fights(player, fight_ids)? {
            for drop in &fight.drops {
                let name = drop.display_name();
                let category = drop.kind.category();
                let unit_price = self.unit_price(drop)?;
                match details.iter_mut().find(|d| {
                    d.name == name && d.category == category && d.unit_price == unit_price
                }) {
                    Some(detail) => detail.quantity += drop.quantity,
                    None => details.push(DropDetail {
                        name,
                        category,
                        quantity: drop.quantity,
                        unit_price,
                    }),
                }
            }
        }
        Ok(details)
    }

    pub fn last_fight(&self, player: &str) -> Result<Option<Fight>> {
        Ok(self
            .repo
            .fights_between(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)?
            .into_iter()
            .find(|f| played_by(f, player)))
    }

    pub fn last_fight_totals(&self, player: &str) -> Result<Option<Totals>> {
        match self.last_fight(player)? {
            Some(fight) => Ok(Some(self.totals(player, &[fight.id])?)),
            None => Ok(None),
        }
    }

    pub fn last_fight_drop_details(&self, player: &str) -> Result<Vec<DropDetail>> {
        match self.last_fight(player)? {
            Some(fight) => self.drop_details(player, &[fight.id]),
            None => Ok(Vec::new()),
        }
    }

    /// The newest open instance the player fought in, else the newest such instance.
    pub fn current_or_last_instance(&self, player: &str) -> Result<Option<Instance>> {
        let candidates: Vec<Instance> = self
            .repo
            .instances_between(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)?
            .into_iter()
            .filter(|i| self.has_player_fights(i.id, player))
            .collect();
        let open = candidates.iter().find(|i| i.is_open()).cloned();
        Ok(open.or_else(|| candidates.into_iter().next()))
    }

    pub fn current_or_last_instance_summary(
        &self,
        player: &str,
        now: Timestamp,
    ) -> Result<Option<InstanceSummary>> {
        match self.current_or_last_instance(player)? {
            Some(instance) => Ok(Some(self.summarize_instance(&instance, player, now)?)),
            None => Ok(None),
        }
    }

    pub fn current_or_last_instance_drop_details(&self, player: &str) -> Result<Vec<DropDetail>> {
        let Some(instance) = self.current_or_last_instance(player)? else {
            return Ok(Vec::new());
        };
        let ids: Vec<FightId> = self
            .repo
            .fights_in_instance(instance.id)?
            .iter()
            .filter(|f| played_by(f, player))
            .map(|f| f.id)
            .collect();
        self.drop_details(player, &ids)
    }

    /// The most recently finished instance the player fought in.
    pub fn last_finished_instance(
        &self,
        player: &str,
        now: Timestamp,
    ) -> Result<Option<InstanceSummary>> {
        let finished = self
            .repo
            .instances_between(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)?
            .into_iter()
            .filter(|i| !i.is_open() && self.has_player_fights(i.id, player))
            .max_by_key(|i| i.end);
        match finished {
            Some(instance) => Ok(Some(self.summarize_instance(&instance, player, now)?)),
            None => Ok(None),
        }
    }

    fn has_player_fights(&self, id: InstanceId, player: &str) -> bool {
        self.repo
            .fights_in_instance(id)
            .map(|fights| fights.iter().any(|f| played_by(f, player)))
            .unwrap_or(false)
    }

    fn player_fights(&self, player: &str, fight_ids: &[FightId]) -> Result<Vec<Fight>> {
        let mut fights = Vec::new();
        for &id in fight_ids {
            if let Some(fight) = self.repo.fight(id)?
                && played_by(&fight, player)
            {
                fights.push(fight);
            }
        }
        Ok(fights)
    }

    fn summarize_instance(
        &self,
        instance: &Instance,
        player: &str,
        now: Timestamp,
    ) -> Result<InstanceSummary> {
        let mut totals = Totals::default();
        for fight in self.repo.fights_in_instance(instance.id)? {
            if played_by(&fight, player) {
                totals.add(&fight, self.fight_value(&fight)?);
            }
        }
        Ok(InstanceSummary {
            id: instance.id,
            name: instance.name.clone(),
            difficulty: instance.difficulty,
            start: instance.start,
            end: instance.end,
            duration_secs: instance.duration(now).num_seconds(),
            totals,
        })
    }

    fn summarize_fight(&self, fight: &Fight) -> Result<FightSummary> {
        let instance_name = match fight.instance_id {
            Some(id) => self.repo.instance(id)?.map(|i| i.name).unwrap_or_default(),
            None => String::new(),
        };
        let drops = fight
            .drops
            .iter()
            .map(|d| {
                if d.quantity > 1 {
                    format!("{} ({})", d.display_name(), d.quantity)
                } else {
                    d.display_name()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        Ok(FightSummary {
            id: fight.id,
            start: fight.start,
            end: fight.end,
            instance_id: fight.instance_id,
            instance_name,
            opponents: fight.opponent_labels(),
            exp: fight.exp,
            psycho: fight.psycho,
            gold: fight.gold,
            drop_value: self.fight_value(fight)?,
            drops,
        })
    }
}

fn played_by(fight: &Fight, player: &str) -> bool {
    fight
        .player_name
        .as_deref()
        .is_some_and(|name| name.to_lowercase() == player.to_lowercase())
}
