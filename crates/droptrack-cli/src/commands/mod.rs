//! CLI command implementations.

pub mod export;
pub mod listen;
pub mod preferences;
pub mod replay;
pub mod summary;
