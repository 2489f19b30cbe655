//! Drop parsing and valuation.
//!
//! - `EquipmentRecord` / `ValueRules` - equipment pieces and their price rules
//! - `collect_drops` - every drop listed in a self entry of a fight summary

mod collect;
mod equipment;

pub use collect::*;
pub use equipment::*;
