//! Wire protocol decoding.
//!
//! This module contains the layers between raw bytes and typed messages:
//! - `FrameReassembler` - byte chunks to zero-delimited frames
//! - `Envelope` / `MessageKind` - frame prefix and payload
//! - `Fields` - positional tokenizer for nested payload levels

mod envelope;
mod fields;
mod reassembler;

pub use envelope::*;
pub use fields::*;
pub use reassembler::*;
