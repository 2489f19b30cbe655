use tracing::trace;

use crate::config::delimiters::{PROPERTY, SEGMENT, VALUE};
use crate::config::valuation::{
    SHARD_QUALITY_THRESHOLD, SPECIAL_SLOT_MULTIPLIER, TRASH_SLOT_MULTIPLIER,
};
use crate::config::{CoefficientTable, GameConfig, NameMultiplier};
use crate::error::Result;
use crate::model::EquipmentSlot;
use crate::storage::Repository;

/// Positions inside one equipment record.
mod layout {
    /// `[-]` segments a record must have.
    pub const MIN_SEGMENTS: usize = 4;
    pub const NAME: usize = 0;
    pub const RANK: usize = 1;
    pub const PROPERTIES: usize = 3;
    /// `$` property holding the comma-delimited stats.
    pub const STATS: usize = 2;
    pub const RAW_VALUE: usize = 3;
    pub const ORNAMENTS: usize = 18;
    /// `$` property describing an embedded orb.
    pub const ORB: usize = 16;
    pub const ORB_CODE_PARTS: [usize; 3] = [0, 5, 6];
}

/// One equipment piece as reported in a fight summary.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentRecord {
    pub name: String,
    /// Quality rank, 1-based.
    pub rank: Option<i64>,
    pub raw_value: Option<f64>,
    pub ornament_count: Option<i64>,
    /// Artifact code of an embedded orb.
    pub orb_code: Option<String>,
}

impl EquipmentRecord {
    /// Parse a `[-]`-segmented equipment record.
    ///
    /// Returns `None` for records with fewer than four segments.
    pub fn parse(record: &str) -> Option<Self> {
        let segments: Vec<&str> = record.split(SEGMENT).collect();
        if segments.len() < layout::MIN_SEGMENTS {
            trace!("Equipment record too short: {:?}", record);
            return None;
        }

        let properties: Vec<&str> = segments[layout::PROPERTIES].split(PROPERTY).collect();
        let stats: Vec<&str> = properties
            .get(layout::STATS)
            .map(|s| s.split(VALUE).collect())
            .unwrap_or_default();

        let orb_code = properties.get(layout::ORB).and_then(|orb| {
            let parts: Vec<&str> = orb.split(VALUE).collect();
            layout::ORB_CODE_PARTS
                .iter()
                .map(|&i| parts.get(i).copied())
                .collect::<Option<Vec<&str>>>()
                .map(|code| code.join("_"))
        });

        Some(Self {
            name: segments[layout::NAME].to_string(),
            rank: segments[layout::RANK].trim().parse().ok(),
            raw_value: stats
                .get(layout::RAW_VALUE)
                .and_then(|v| v.trim().parse().ok()),
            ornament_count: stats
                .get(layout::ORNAMENTS)
                .and_then(|v| v.trim().parse().ok()),
            orb_code,
        })
    }

    pub fn is_quoted(&self) -> bool {
        self.name.contains('"')
    }
}

/// Equipment pricing rules with the shard and essence prices resolved.
#[derive(Debug, Clone)]
pub struct ValueRules<'a> {
    coefficients: &'a CoefficientTable,
    multipliers: &'a [NameMultiplier],
    shard_price: i64,
    essence_price: i64,
}

impl<'a> ValueRules<'a> {
    pub fn new(config: &'a GameConfig, shard_price: i64, essence_price: i64) -> Self {
        Self {
            coefficients: &config.quote_item_coefficients,
            multipliers: &config.name_multipliers,
            shard_price,
            essence_price,
        }
    }

    /// Resolve shard and essence prices from the item catalog (missing entries price at 0).
    pub fn from_catalog(config: &'a GameConfig, repo: &dyn Repository) -> Result<Self> {
        let price_of = |name: &str| -> Result<i64> {
            Ok(repo.item_price(name)?.map_or(0, |price| price.value))
        };
        Ok(Self::new(
            config,
            price_of(&config.shard_name)?,
            price_of(&config.essence_name)?,
        ))
    }

    /// Value of one equipment piece.
    ///
    /// Special pieces: quoted names use the coefficient table, fixed name
    /// fragments are priced in shards, everything else falls back to the
    /// raw value scaled by the slot multiplier.
    pub fn value(&self, record: &EquipmentRecord, slot: EquipmentSlot) -> i64 {
        match slot {
            EquipmentSlot::Special => {
                if record.is_quoted() {
                    if let Some(value) = self.quoted_value(record) {
                        return value;
                    }
                } else if let Some(value) = self.fragment_value(&record.name) {
                    return value;
                }
                scaled(record.raw_value, SPECIAL_SLOT_MULTIPLIER)
            }
            EquipmentSlot::Trash => scaled(record.raw_value, TRASH_SLOT_MULTIPLIER),
        }
    }

    fn quoted_value(&self, record: &EquipmentRecord) -> Option<i64> {
        let (ornaments, rank) = (record.ornament_count?, record.rank?);
        let coefficient = self.coefficients.get(ornaments, rank)?;
        let base = if rank >= SHARD_QUALITY_THRESHOLD {
            self.shard_price
        } else {
            self.essence_price
        };
        Some(coefficient * base)
    }

    fn fragment_value(&self, name: &str) -> Option<i64> {
        self.multipliers
            .iter()
            .find(|m| name.contains(&m.fragment))
            .map(|m| m.multiplier * self.shard_price)
    }
}

fn scaled(raw: Option<f64>, multiplier: f64) -> i64 {
    (raw.unwrap_or(0.0) * multiplier).round_ties_even() as i64
}
