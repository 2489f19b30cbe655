use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::valuation::{COEFFICIENT_COLS, COEFFICIENT_ROWS};
use crate::error::{Error, Result};

/// A name fragment that prices special equipment as a fixed number of shards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMultiplier {
    pub fragment: String,
    pub multiplier: i64,
}

impl NameMultiplier {
    pub fn new(fragment: &str, multiplier: i64) -> Self {
        Self {
            fragment: fragment.to_string(),
            multiplier,
        }
    }
}

/// Ornament × quality coefficient table for quoted equipment.
///
/// Rows are indexed by ornament count, columns by `quality - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientTable {
    rows: Vec<Vec<i64>>,
}

impl CoefficientTable {
    pub fn new(rows: Vec<Vec<i64>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count, taken from the first row.
    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Coefficient for an ornament count and a 1-based quality rank.
    ///
    /// Returns `None` when either index is outside the table.
    pub fn get(&self, ornament: i64, quality: i64) -> Option<i64> {
        if ornament < 0 || quality < 1 {
            return None;
        }
        let (row, col) = (ornament as usize, (quality - 1) as usize);
        if row >= self.row_count() || col >= self.col_count() {
            return None;
        }
        // Short rows read as zero, like a zero-initialised matrix.
        Some(self.rows[row].get(col).copied().unwrap_or(0))
    }
}

impl Default for CoefficientTable {
    fn default() -> Self {
        Self {
            rows: vec![vec![0; COEFFICIENT_COLS]; COEFFICIENT_ROWS],
        }
    }
}

fn default_shard_name() -> String {
    "Odłamek".to_string()
}

fn default_essence_name() -> String {
    "Esencja".to_string()
}

fn default_name_multipliers() -> Vec<NameMultiplier> {
    vec![
        NameMultiplier::new("Smoków", 12),
        NameMultiplier::new("Vorlingów", 30),
        NameMultiplier::new("Lodu", 30),
        NameMultiplier::new("Władców", 150),
        NameMultiplier::new("Dawnych Orków", 60),
    ]
}

/// Game rules loaded from `config.json`.
///
/// Keys are PascalCase so existing configuration files keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GameConfig {
    /// Groups of bosses that must all die to finish an instance.
    pub boss_groups: Vec<Vec<String>>,
    /// Bosses that must be killed a number of times.
    pub multi_kill_bosses: BTreeMap<String, u32>,
    /// Bosses whose single kill finishes an instance.
    pub single_bosses: BTreeSet<String>,
    pub quote_item_coefficients: CoefficientTable,
    /// Instances that end when the tracked player dies.
    pub death_end_instances: BTreeSet<String>,
    /// Plain-item catalog name of the shard currency.
    #[serde(default = "default_shard_name")]
    pub shard_name: String,
    /// Plain-item catalog name of the essence currency.
    #[serde(default = "default_essence_name")]
    pub essence_name: String,
    #[serde(default = "default_name_multipliers")]
    pub name_multipliers: Vec<NameMultiplier>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            boss_groups: Vec::new(),
            multi_kill_bosses: BTreeMap::new(),
            single_bosses: BTreeSet::new(),
            quote_item_coefficients: CoefficientTable::default(),
            death_end_instances: BTreeSet::new(),
            shard_name: default_shard_name(),
            essence_name: default_essence_name(),
            name_multipliers: default_name_multipliers(),
        }
    }
}

impl GameConfig {
    /// Load config from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse config from JSON content.
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigParseError(e.to_string()))
    }

    /// Load config, falling back to defaults when the file is missing or malformed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No game config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load game config {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn boss_rules(&self) -> BossRules {
        BossRules {
            groups: self.boss_groups.clone(),
            multi_kill: self.multi_kill_bosses.clone(),
            single: self.single_bosses.clone(),
            death_end_instances: self.death_end_instances.clone(),
        }
    }
}

/// Completion rules consumed by the instance tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BossRules {
    pub groups: Vec<Vec<String>>,
    pub multi_kill: BTreeMap<String, u32>,
    pub single: BTreeSet<String>,
    pub death_end_instances: BTreeSet<String>,
}

impl BossRules {
    /// Required kill count if `name` is a multi-kill boss.
    pub fn required_kills(&self, name: &str) -> Option<u32> {
        self.multi_kill.get(name).copied()
    }

    /// Index of the first group containing `name`.
    pub fn group_of(&self, name: &str) -> Option<usize> {
        self.groups
            .iter()
            .position(|group| group.iter().any(|member| member == name))
    }

    pub fn is_single(&self, name: &str) -> bool {
        self.single.contains(name)
    }

    pub fn ends_on_death(&self, instance_name: &str) -> bool {
        self.death_end_instances.contains(instance_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pascal_case_config() {
        let content = r#"{
            "BossGroups": [["A", "B", "C"]],
            "MultiKillBosses": { "Hydra": 3 },
            "SingleBosses": ["Lich"],
            "QuoteItemCoefficients": [[1, 2], [3, 4]],
            "DeathEndInstances": ["Arena"]
        }"#;
        let config = GameConfig::parse(content).unwrap();

        assert_eq!(config.boss_groups, vec![vec!["A", "B", "C"]]);
        assert_eq!(config.multi_kill_bosses.get("Hydra"), Some(&3));
        assert!(config.single_bosses.contains("Lich"));
        assert_eq!(config.quote_item_coefficients.get(1, 2), Some(4));
        assert!(config.death_end_instances.contains("Arena"));
        // Unlisted keys fall back to defaults
        assert_eq!(config.shard_name, "Odłamek");
        assert_eq!(config.name_multipliers.len(), 5);
    }

    #[test]
    fn test_parse_empty_object() {
        let config = GameConfig::parse("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.quote_item_coefficients.row_count(), 9);
        assert_eq!(config.quote_item_coefficients.col_count(), 12);
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = GameConfig::parse("{ not json");
        assert!(matches!(result, Err(Error::ConfigParseError(_))));
    }

    #[test]
    fn test_coefficient_bounds() {
        let table = CoefficientTable::new(vec![vec![5, 6, 7], vec![8]]);
        assert_eq!(table.get(0, 1), Some(5));
        assert_eq!(table.get(0, 3), Some(7));
        assert_eq!(table.get(1, 3), Some(0));
        assert_eq!(table.get(2, 1), None);
        assert_eq!(table.get(0, 4), None);
        assert_eq!(table.get(0, 0), None);
        assert_eq!(table.get(-1, 1), None);
    }

    #[test]
    fn test_boss_rules_lookup() {
        let config = GameConfig {
            boss_groups: vec![vec!["A".into(), "B".into()], vec!["C".into()]],
            ..Default::default()
        };
        let rules = config.boss_rules();
        assert_eq!(rules.group_of("B"), Some(0));
        assert_eq!(rules.group_of("C"), Some(1));
        assert_eq!(rules.group_of("D"), None);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = GameConfig::load_or_default(dir.path().join("config.json"));
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = GameConfig::default();
        config.single_bosses.insert("Lich".to_string());
        config.save(&path).unwrap();

        let loaded = GameConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
