use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::{
    ArtifactPrice, Fight, FightId, Instance, InstanceId, ItemPrice, NewInstance, Player, Timestamp,
};
use crate::storage::Repository;

/// In-process repository, persisted as a single JSON snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryRepository {
    next_instance_id: InstanceId,
    next_fight_id: FightId,
    next_player_id: u64,
    instances: Vec<Instance>,
    fights: Vec<Fight>,
    players: Vec<Player>,
    item_prices: BTreeMap<String, i64>,
    artifact_prices: Vec<ArtifactPrice>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load a snapshot, starting empty when the file is missing or unreadable.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::new();
        }
        match Self::load(path) {
            Ok(repo) => {
                info!(
                    "Loaded store from {:?} ({} instances, {} fights)",
                    path,
                    repo.instances.len(),
                    repo.fights.len()
                );
                repo
            }
            Err(e) => {
                warn!("Failed to load store {:?}: {}, starting fresh", path, e);
                Self::new()
            }
        }
    }

    /// Write the snapshot through a temporary file renamed into place.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn fight_count(&self) -> usize {
        self.fights.len()
    }

    fn fight_mut(&mut self, id: FightId) -> Result<&mut Fight> {
        self.fights
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::RecordNotFound(format!("fight {}", id)))
    }
}

fn newest_first<T>(mut items: Vec<T>, start: impl Fn(&T) -> Timestamp) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(start(item)));
    items
}

impl Repository for MemoryRepository {
    fn create_instance(&mut self, new: NewInstance) -> Result<Instance> {
        self.next_instance_id += 1;
        let instance = Instance {
            id: self.next_instance_id,
            correlation_id: new.correlation_id,
            name: new.name,
            difficulty: new.difficulty,
            start: new.start,
            end: None,
        };
        self.instances.push(instance.clone());
        Ok(instance)
    }

    fn instance(&self, id: InstanceId) -> Result<Option<Instance>> {
        Ok(self.instances.iter().find(|i| i.id == id).cloned())
    }

    fn instance_by_correlation(&self, correlation_id: &str) -> Result<Option<Instance>> {
        Ok(self
            .instances
            .iter()
            .find(|i| i.correlation_id == correlation_id)
            .cloned())
    }

    fn open_instances(&self) -> Result<Vec<Instance>> {
        let mut open: Vec<Instance> = self
            .instances
            .iter()
            .filter(|i| i.is_open())
            .cloned()
            .collect();
        open.sort_by_key(|i| i.start);
        Ok(open)
    }

    fn close_instance(&mut self, id: InstanceId, end: Timestamp) -> Result<bool> {
        let instance = self
            .instances
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::RecordNotFound(format!("instance {}", id)))?;
        Ok(instance.close(end))
    }

    fn instances_between(&self, from: Timestamp, to: Timestamp) -> Result<Vec<Instance>> {
        let matching = self
            .instances
            .iter()
            .filter(|i| i.start >= from && i.start <= to)
            .cloned()
            .collect();
        Ok(newest_first(matching, |i: &Instance| i.start))
    }

    fn create_fight(&mut self, start: Timestamp, instance_id: Option<InstanceId>) -> Result<Fight> {
        self.next_fight_id += 1;
        let fight = Fight::new(self.next_fight_id, start, instance_id);
        self.fights.push(fight.clone());
        Ok(fight)
    }

    fn fight(&self, id: FightId) -> Result<Option<Fight>> {
        Ok(self.fights.iter().find(|f| f.id == id).cloned())
    }

    fn open_fights(&self) -> Result<Vec<Fight>> {
        let mut open: Vec<Fight> = self.fights.iter().filter(|f| f.is_open()).cloned().collect();
        open.sort_by_key(|f| f.start);
        Ok(open)
    }

    fn update_fight(&mut self, fight: &Fight) -> Result<()> {
        *self.fight_mut(fight.id)? = fight.clone();
        Ok(())
    }

    fn fights_between(&self, from: Timestamp, to: Timestamp) -> Result<Vec<Fight>> {
        let matching = self
            .fights
            .iter()
            .filter(|f| f.start >= from && f.start <= to)
            .cloned()
            .collect();
        Ok(newest_first(matching, |f: &Fight| f.start))
    }

    fn fights_in_instance(&self, id: InstanceId) -> Result<Vec<Fight>> {
        let matching = self
            .fights
            .iter()
            .filter(|f| f.instance_id == Some(id))
            .cloned()
            .collect();
        Ok(newest_first(matching, |f: &Fight| f.start))
    }

    fn upsert_player(&mut self, name: &str) -> Result<Player> {
        if let Some(player) = self.players.iter().find(|p| p.name == name) {
            return Ok(player.clone());
        }
        self.next_player_id += 1;
        let player = Player {
            id: self.next_player_id,
            name: name.to_string(),
        };
        self.players.push(player.clone());
        Ok(player)
    }

    fn players(&self) -> Result<Vec<Player>> {
        Ok(self.players.clone())
    }

    fn item_price(&self, name: &str) -> Result<Option<ItemPrice>> {
        Ok(self.item_prices.get(name).map(|&value| ItemPrice {
            name: name.to_string(),
            value,
        }))
    }

    fn save_item_price(&mut self, price: ItemPrice) -> Result<()> {
        self.item_prices.insert(price.name, price.value);
        Ok(())
    }

    fn item_prices(&self) -> Result<Vec<ItemPrice>> {
        Ok(self
            .item_prices
            .iter()
            .map(|(name, &value)| ItemPrice {
                name: name.clone(),
                value,
            })
            .collect())
    }

    fn artifact_price_by_code(&self, code: &str) -> Result<Option<ArtifactPrice>> {
        Ok(self.artifact_prices.iter().find(|a| a.code == code).cloned())
    }

    fn artifact_price_by_name(&self, name: &str) -> Result<Option<ArtifactPrice>> {
        Ok(self.artifact_prices.iter().find(|a| a.name == name).cloned())
    }

    fn insert_artifact_price(&mut self, price: ArtifactPrice) -> Result<()> {
        self.artifact_prices.push(price);
        Ok(())
    }

    fn replace_artifact_price(&mut self, code: &str, price: ArtifactPrice) -> Result<()> {
        let entry = self
            .artifact_prices
            .iter_mut()
            .find(|a| a.code == code)
            .ok_or_else(|| Error::RecordNotFound(format!("artifact {}", code)))?;
        *entry = price;
        Ok(())
    }

    fn artifact_prices(&self) -> Result<Vec<ArtifactPrice>> {
        Ok(self.artifact_prices.clone())
    }
}
