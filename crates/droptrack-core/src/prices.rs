//! Price catalog broadcasts.

use tracing::{debug, trace};

use crate::config::delimiters::{PRICE_ENTRY, VALUE};
use crate::error::Result;
use crate::model::{ArtifactPrice, ItemPrice};
use crate::protocol::Fields;
use crate::storage::Repository;

/// Artifact entries carry the display name from this field on.
const ARTIFACT_NAME_FIELD: usize = 4;

/// Comma-delimited entries of a broadcast; entries without a comma are skipped.
fn entries(payload: &str) -> impl Iterator<Item = Fields<'_>> {
    payload
        .split(PRICE_ENTRY)
        .map(str::trim)
        .filter(|entry| entry.contains(VALUE))
        .map(|entry| Fields::split(entry, VALUE))
}

/// Upsert every plain-item price in a broadcast. Returns the number of entries applied.
///
/// Entries are `name,value`, or `id,name,value` with a leading id.
pub fn ingest_item_prices(payload: &str, repo: &mut dyn Repository) -> Result<usize> {
    let mut applied = 0;
    for fields in entries(payload) {
        let (name, value) = if fields.len() >= 3 {
            (fields.text(1), fields.int_or_zero(2))
        } else {
            (fields.text(0), fields.int_or_zero(1))
        };
        trace!("Item price {} = {}", name, value);
        repo.save_item_price(ItemPrice {
            name: name.to_string(),
            value,
        })?;
        applied += 1;
    }
    debug!("Applied {} item prices", applied);
    Ok(applied)
}

/// Upsert every artifact price in a broadcast. Returns the number of entries applied.
///
/// Entries are `code,value,...,name`; an existing entry matching either the
/// code or the name is overwritten.
pub fn ingest_artifact_prices(payload: &str, repo: &mut dyn Repository) -> Result<usize> {
    let mut applied = 0;
    for fields in entries(payload) {
        let code = fields.text(0);
        let value = fields.int_or_zero(1);
        let name = if fields.len() > ARTIFACT_NAME_FIELD {
            fields.join_from(ARTIFACT_NAME_FIELD, VALUE)
        } else {
            fields.text(fields.len() - 1).to_string()
        };

        let existing = match repo.artifact_price_by_code(code)? {
            Some(found) => Some(found),
            None => repo.artifact_price_by_name(&name)?,
        };
        let price = ArtifactPrice {
            code: code.to_string(),
            name,
            value,
        };
        trace!("Artifact price {} ({}) = {}", price.code, price.name, price.value);

        match existing {
            Some(old) => repo.replace_artifact_price(&old.code, price)?,
            None => repo.insert_artifact_price(price)?,
        }
        applied += 1;
    }
    debug!("Applied {} artifact prices", applied);
    Ok(applied)
}
