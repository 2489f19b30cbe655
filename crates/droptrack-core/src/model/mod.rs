//! Session records.
//!
//! This module contains the entities produced by the capture session:
//! - `Instance` - one dungeon run
//! - `Fight` - one combat encounter with its totals, drops and kill tally
//! - `Drop` - one looted item, equipment piece, drif or orb
//! - `ItemPrice` / `ArtifactPrice` - price catalog entries
//! - `Player` - tracked player identity

mod drop;
mod fight;
mod instance;
mod price;

pub use drop::*;
pub use fight::*;
pub use instance::*;
pub use price::*;

use chrono::{DateTime, Utc};

/// Event time as observed by the capture thread.
pub type Timestamp = DateTime<Utc>;

pub type InstanceId = u64;
pub type FightId = u64;
pub type PlayerId = u64;
