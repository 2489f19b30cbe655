use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// What kind of loot a drop is.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    IntoStaticStr,
)]
pub enum DropKind {
    /// Plain item, valued later from the item catalog by name.
    #[strum(serialize = "Item")]
    Item,
    /// Equipment piece, valued when parsed.
    #[strum(serialize = "Equipment")]
    Equipment,
    /// Currency drif, valued later from the artifact catalog by name.
    #[strum(serialize = "Drif")]
    Drif,
    /// Orb embedded in an equipment piece, resolved by artifact code.
    #[strum(serialize = "Orb")]
    Orb,
}

impl DropKind {
    /// Coarse grouping used by drop summaries.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Item => "Item",
            Self::Equipment => "Equipment",
            Self::Drif | Self::Orb => "Artifact",
        }
    }
}

/// Equipment list a piece was reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum EquipmentSlot {
    Special,
    Trash,
}

/// One looted entry attached to a fight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    pub kind: DropKind,
    pub name: String,
    pub quantity: i64,
    /// Value of the whole drop when known at parse time.
    ///
    /// Always set for equipment. `None` for items and drifs, which are
    /// priced from the catalogs when read.
    pub value: Option<i64>,
    pub rank: Option<i64>,
    pub ornament_count: Option<i64>,
    /// Artifact lookup code (orbs).
    pub code: Option<String>,
    pub slot: Option<EquipmentSlot>,
}

impl DropEntry {
    pub fn item(name: &str, quantity: i64) -> Self {
        Self::commodity(DropKind::Item, name, quantity)
    }

    pub fn drif(name: &str) -> Self {
        Self::commodity(DropKind::Drif, name, 1)
    }

    pub fn equipment(
        name: &str,
        slot: EquipmentSlot,
        value: i64,
        rank: Option<i64>,
        ornament_count: Option<i64>,
    ) -> Self {
        Self {
            kind: DropKind::Equipment,
            name: name.to_string(),
            quantity: 1,
            value: Some(value),
            rank,
            ornament_count,
            code: None,
            slot: Some(slot),
        }
    }

    pub fn orb(code: &str, name: &str, value: i64) -> Self {
        Self {
            kind: DropKind::Orb,
            name: name.to_string(),
            quantity: 1,
            value: Some(value),
            rank: None,
            ornament_count: None,
            code: Some(code.to_string()),
            slot: None,
        }
    }

    fn commodity(kind: DropKind, name: &str, quantity: i64) -> Self {
        Self {
            kind,
            name: name.to_string(),
            quantity,
            value: None,
            rank: None,
            ornament_count: None,
            code: None,
            slot: None,
        }
    }

    /// Name with the ornament count appended, e.g. `Sword "Dawn" (3 orn.)`.
    pub fn display_name(&self) -> String {
        match self.ornament_count {
            Some(count) if count > 0 => format!("{} ({} orn.)", self.name, count),
            _ => self.name.clone(),
        }
    }
}
