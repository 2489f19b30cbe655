pub mod config;
pub mod drops;
pub mod error;
pub mod events;
pub mod export;
pub mod model;
pub mod prices;
pub mod protocol;
pub mod session;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use config::{GameConfig, Preferences};
pub use error::{Error, Result};
pub use events::{
    AudioCue, Cue, EventBus, EventSink, FnSink, LifecycleEvent, Silent, TerminalBell,
};
pub use model::{
    ArtifactPrice, DropEntry, DropKind, EquipmentSlot, Fight, FightId, Instance, InstanceId,
    ItemPrice, Player, Timestamp,
};
pub use protocol::{Envelope, FrameReassembler, MessageKind};
pub use session::{FrameCounters, FrameLog, LoggedFrame, Session, SharedSession, read_frame_log};
pub use stats::{DropDetail, FightSummary, InstanceSummary, Stats, Totals};
pub use storage::{MemoryRepository, Repository};
