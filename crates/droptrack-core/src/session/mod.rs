//! Capture session.
//!
//! This module contains the session that turns stream bytes into records:
//! - `Session` - reassembly, dispatch and the state machines
//! - `SharedSession` - a session behind one mutex
//! - `FrameLog` / `LoggedFrame` - raw frame log and its replay format

mod frame_log;
mod shared;
mod state;

pub use frame_log::*;
pub use shared::*;
pub use state::*;
