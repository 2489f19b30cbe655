use tracing::debug;

use super::{EquipmentRecord, ValueRules};
use crate::config::delimiters::SEGMENT;
use crate::error::Result;
use crate::model::{DropEntry, EquipmentSlot};
use crate::protocol::{Fields, split_quantity, split_records};
use crate::storage::Repository;

/// Self entry fields carrying drop lists.
pub mod slot_field {
    pub const SPECIAL_EQUIPMENT: usize = 7;
    pub const ITEMS: usize = 9;
    pub const DRIFS: usize = 25;
    pub const TRASH_EQUIPMENT: usize = 27;
}

/// Plain items from a `name(qty)` record list.
pub fn parse_items(list: &str) -> Vec<DropEntry> {
    split_records(list)
        .into_iter()
        .map(|record| {
            let (name, quantity) = split_quantity(record);
            DropEntry::item(name, quantity)
        })
        .collect()
}

/// Drifs from a `name[-]tag` record list; the tag is dropped.
pub fn parse_drifs(list: &str) -> Vec<DropEntry> {
    split_records(list)
        .into_iter()
        .filter_map(|record| record.split(SEGMENT).next())
        .map(DropEntry::drif)
        .collect()
}

/// Equipment pieces of one slot, each followed by its embedded orb if any.
pub fn parse_equipment(
    list: &str,
    slot: EquipmentSlot,
    rules: &ValueRules<'_>,
    repo: &dyn Repository,
) -> Result<Vec<DropEntry>> {
    let mut drops = Vec::new();
    for record in split_records(list) {
        let Some(piece) = EquipmentRecord::parse(record) else {
            debug!("Skipping malformed {} equipment record", slot);
            continue;
        };

        let value = rules.value(&piece, slot);
        drops.push(DropEntry::equipment(
            &piece.name,
            slot,
            value,
            piece.rank,
            piece.ornament_count,
        ));

        if let Some(code) = &piece.orb_code {
            let orb = match repo.artifact_price_by_code(code)? {
                Some(price) => DropEntry::orb(code, &price.name, price.value),
                None => DropEntry::orb(code, "", 0),
            };
            drops.push(orb);
        }
    }
    Ok(drops)
}

/// All drops of a self entry: items, drifs, special then trash equipment.
pub fn collect_drops(
    entry: &Fields<'_>,
    rules: &ValueRules<'_>,
    repo: &dyn Repository,
) -> Result<Vec<DropEntry>> {
    let mut drops = parse_items(entry.text(slot_field::ITEMS));
    drops.extend(parse_drifs(entry.text(slot_field::DRIFS)));
    drops.extend(parse_equipment(
        entry.text(slot_field::SPECIAL_EQUIPMENT),
        EquipmentSlot::Special,
        rules,
        repo,
    )?);
    drops.extend(parse_equipment(
        entry.text(slot_field::TRASH_EQUIPMENT),
        EquipmentSlot::Trash,
        rules,
        repo,
    )?);
    Ok(drops)
}
