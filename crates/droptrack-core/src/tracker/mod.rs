//! Session state machines.
//!
//! - `FightTracker` - the open combat encounter
//! - `InstanceTracker` - the open dungeon run and its completion latch

mod fight;
mod instance;

pub use fight::*;
pub use instance::*;
